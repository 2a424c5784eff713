//! Engine error types

use featuremill_store::StoreError;
use thiserror::Error;

/// Engine error
#[derive(Error, Debug)]
pub enum EngineError {
    /// Underlying store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A source or label row is missing a required column
    #[error("Missing column '{column}' in table '{table}'")]
    MissingColumn { table: String, column: String },

    /// A cell had the wrong type for its role
    #[error("Type mismatch in '{table}.{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },

    /// Feature derivation requires a timestamped source table
    #[error("Source table '{0}' has no timestamp column")]
    SourceNotTimestamped(String),

    /// Lookup requested a feature the table does not have
    #[error("Unknown feature '{feature}' in table '{table}'")]
    UnknownFeature { table: String, feature: String },

    /// Lookup against a table that is neither a feature nor a dimension table
    #[error("Table '{0}' cannot be used for feature lookups")]
    NotLookupTable(String),

    /// A requested feature column collides with a label-frame column
    #[error("Feature column '{0}' collides with a label column")]
    ColumnCollision(String),

    /// The declared label column is absent from the label frame
    #[error("Label column not found: {0}")]
    LabelColumnNotFound(String),

    /// Feature-table lookup declared without a timestamp key
    #[error("Lookup on feature table '{0}' requires a timestamp_lookup_key")]
    MissingTimestampKey(String),

    /// Generic assembly error
    #[error("Assembly error: {0}")]
    Assembly(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
