//! SDK error types

use thiserror::Error;

/// Client error
#[derive(Error, Debug)]
pub enum ClientError {
    /// Spec loading or validation failure
    #[error("Spec error: {0}")]
    Spec(#[from] featuremill_spec::SpecError),

    /// Store failure
    #[error("Store error: {0}")]
    Store(#[from] featuremill_store::StoreError),

    /// Compute or assembly failure
    #[error("Engine error: {0}")]
    Engine(#[from] featuremill_engine::EngineError),

    /// Core type failure
    #[error("Core error: {0}")]
    Core(#[from] featuremill_core::CoreError),

    /// Operation referenced a table the spec does not declare
    #[error("Table not declared in spec: {0}")]
    UnknownSpecTable(String),

    /// Training-set operations require a label table in the spec
    #[error("No label table declared in the spec")]
    NoLabelSpec,

    /// Builder misconfiguration
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, ClientError>;
