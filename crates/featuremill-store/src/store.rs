//! The `FeatureStore` trait and its supporting types
//!
//! All build and lookup operations are async batch transformations.
//! Builds assume a single writer per table; lookups are read-only and
//! safe to run concurrently.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use featuremill_core::{FeatureRow, Row, Value};
use std::collections::HashMap;

/// Key columns of a materialized feature table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableKeys {
    /// Entity key column (e.g. customer_id)
    pub entity_key: String,
    /// Observation timestamp column (e.g. observation_date)
    pub timestamp_key: String,
}

impl TableKeys {
    pub fn new(entity_key: impl Into<String>, timestamp_key: impl Into<String>) -> Self {
        Self {
            entity_key: entity_key.into(),
            timestamp_key: timestamp_key.into(),
        }
    }
}

/// How a build treats existing table state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Recreate the table from the new rows only (`drop_existing=true`)
    Overwrite,
    /// Merge new rows by (entity, timestamp) key, preserving existing
    /// history not covered by the batch (`drop_existing=false`)
    Upsert,
}

impl WriteMode {
    /// Map the orchestrator-facing `drop_existing` flag to a write mode
    pub fn from_drop_existing(drop_existing: bool) -> Self {
        if drop_existing {
            WriteMode::Overwrite
        } else {
            WriteMode::Upsert
        }
    }
}

/// Outcome of one materialization batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub table: String,
    /// Rows in the input batch
    pub rows_written: usize,
    /// Rows in the table after the build
    pub rows_total: usize,
}

/// What a table is, from the store's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Raw loaded table, not usable for lookups until registered/built
    Source,
    /// Materialized, timestamp-indexed feature table
    Feature,
    /// Registered time-invariant dimension table
    Dimension,
}

/// Table metadata for validation ahead of joins
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub kind: TableKind,
    pub entity_key: Option<String>,
    pub timestamp_key: Option<String>,
    /// Columns available for lookup, in stable order
    pub columns: Vec<String>,
}

impl TableInfo {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Async storage backend for feature tables
///
/// # Semantics
///
/// - `materialize` is an atomic batch: it either commits fully or leaves
///   prior table state unchanged. Re-running with identical inputs is
///   idempotent.
/// - `register_dimension` never copies or mutates the underlying source
///   table; it only marks it as entity-keyed lookup source.
/// - `lookup_as_of` returns, per requested column, the value from the row
///   with the greatest timestamp at or before `as_of`, never a newer
///   one. A missing row or column yields an explicit `Value::Null`.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Load (or replace) a raw source table
    async fn load_source(&self, name: &str, rows: Vec<Row>) -> Result<()>;

    /// Read back a raw source table
    async fn source_rows(&self, name: &str) -> Result<Vec<Row>>;

    /// Materialize a batch of computed feature rows into a named table
    async fn materialize(
        &self,
        name: &str,
        keys: &TableKeys,
        rows: Vec<FeatureRow>,
        mode: WriteMode,
    ) -> Result<BuildReport>;

    /// Mark an existing source table as a time-invariant dimension table
    async fn register_dimension(&self, name: &str, entity_key: &str) -> Result<()>;

    /// Describe a table (kind, keys, available columns)
    async fn describe(&self, name: &str) -> Result<TableInfo>;

    /// Point-in-time lookup of feature values for one entity
    ///
    /// Dimension tables ignore `as_of` and return the current row.
    async fn lookup_as_of(
        &self,
        name: &str,
        entity: &Value,
        as_of: DateTime<Utc>,
        feature_names: &[String],
    ) -> Result<HashMap<String, Value>>;

    /// Scan a materialized feature table (tests and backfill inspection)
    async fn feature_rows(&self, name: &str) -> Result<Vec<FeatureRow>>;
}
