//! Store error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Store error
#[derive(Error, Debug)]
pub enum StoreError {
    /// Table does not exist
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Table exists but as a different kind (source/dimension/feature)
    #[error("Table '{0}' already exists as a different kind of table")]
    TableKindConflict(String),

    /// Table exists but was never registered for feature lookups
    #[error("Table '{0}' is not registered for feature lookups")]
    NotRegistered(String),

    /// Two rows share the same (entity, timestamp) key. Uniqueness per
    /// timestamp is what keeps the as-of join tie-break well defined, so
    /// this is a hard failure, never a merge.
    #[error("Duplicate key in table '{table}': entity '{entity}' at {timestamp}")]
    DuplicateKey {
        table: String,
        entity: String,
        timestamp: DateTime<Utc>,
    },

    /// Upsert declared different key columns than the existing table
    #[error("Key mismatch for table '{0}': declared keys differ from the existing table")]
    KeyMismatch(String),

    /// A row is missing a declared key column
    #[error("Missing column '{column}' in table '{table}'")]
    MissingColumn { table: String, column: String },

    /// Value cannot serve as a lookup key (e.g. null)
    #[error("Invalid lookup key: {0}")]
    InvalidKey(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
