//! Error types for Featuremill Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid spec: {0}")]
    InvalidSpec(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
