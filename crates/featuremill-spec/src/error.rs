//! Spec loader error types

use thiserror::Error;

/// Spec loading error
#[derive(Error, Debug)]
pub enum SpecError {
    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Spec failed validation after parsing
    #[error("Invalid spec: {0}")]
    Validation(String),

    /// Spec file could not be read
    #[error("Failed to read spec file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for spec loading operations
pub type Result<T> = std::result::Result<T, SpecError>;
