//! In-memory feature store
//!
//! The embedded `FeatureStore` implementation: source tables, registered
//! dimensions, and materialized feature tables all live behind one
//! `RwLock`. Feature rows are held in a `BTreeMap` keyed by
//! `(entity key, timestamp)`, which makes the as-of lookup a bounded
//! range scan.

use crate::error::{Result, StoreError};
use crate::key::encode_key;
use crate::store::{BuildReport, FeatureStore, TableInfo, TableKeys, TableKind, WriteMode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use featuremill_core::{FeatureRow, Row, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct FeatureTableState {
    keys: TableKeys,
    /// Feature columns in first-seen order
    columns: Vec<String>,
    rows: BTreeMap<(String, DateTime<Utc>), HashMap<String, Value>>,
}

#[derive(Default)]
struct Inner {
    sources: HashMap<String, Vec<Row>>,
    /// Dimension registrations: table name -> entity key column
    dimensions: HashMap<String, String>,
    features: HashMap<String, FeatureTableState>,
}

/// In-memory feature store for tests and embedded use
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stage a batch into a (possibly pre-existing) row map, rejecting
/// duplicate keys within the batch before anything is committed.
fn stage_rows(
    table: &str,
    existing: BTreeMap<(String, DateTime<Utc>), HashMap<String, Value>>,
    batch: Vec<FeatureRow>,
) -> Result<(
    BTreeMap<(String, DateTime<Utc>), HashMap<String, Value>>,
    Vec<String>,
)> {
    let mut staged = existing;
    let mut seen: HashSet<(String, DateTime<Utc>)> = HashSet::new();
    let mut new_columns: Vec<String> = Vec::new();

    for row in batch {
        let entity = encode_key(&row.entity_id)?;
        let key = (entity.clone(), row.observed_at);

        if !seen.insert(key.clone()) {
            return Err(StoreError::DuplicateKey {
                table: table.to_string(),
                entity,
                timestamp: row.observed_at,
            });
        }

        let mut columns: Vec<&String> = row.values.keys().collect();
        columns.sort();
        for column in columns {
            if !new_columns.contains(column) {
                new_columns.push(column.clone());
            }
        }

        staged.insert(key, row.values);
    }

    Ok((staged, new_columns))
}

#[async_trait]
impl FeatureStore for InMemoryStore {
    async fn load_source(&self, name: &str, rows: Vec<Row>) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.features.contains_key(name) {
            return Err(StoreError::TableKindConflict(name.to_string()));
        }
        tracing::debug!(table = name, rows = rows.len(), "loading source table");
        inner.sources.insert(name.to_string(), rows);
        Ok(())
    }

    async fn source_rows(&self, name: &str) -> Result<Vec<Row>> {
        let inner = self.inner.read().await;
        inner
            .sources
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    async fn materialize(
        &self,
        name: &str,
        keys: &TableKeys,
        rows: Vec<FeatureRow>,
        mode: WriteMode,
    ) -> Result<BuildReport> {
        let mut inner = self.inner.write().await;

        if inner.sources.contains_key(name) || inner.dimensions.contains_key(name) {
            return Err(StoreError::TableKindConflict(name.to_string()));
        }

        let rows_written = rows.len();

        // Stage the full table state first; commit only on success so a
        // failed build leaves prior state untouched.
        let (existing_rows, mut columns) = match (mode, inner.features.get(name)) {
            (WriteMode::Upsert, Some(state)) => {
                if state.keys != *keys {
                    return Err(StoreError::KeyMismatch(name.to_string()));
                }
                (state.rows.clone(), state.columns.clone())
            }
            _ => (BTreeMap::new(), Vec::new()),
        };

        let (staged, new_columns) = stage_rows(name, existing_rows, rows)?;
        for column in new_columns {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }

        let rows_total = staged.len();
        inner.features.insert(
            name.to_string(),
            FeatureTableState {
                keys: keys.clone(),
                columns,
                rows: staged,
            },
        );

        tracing::info!(
            table = name,
            mode = ?mode,
            rows_written,
            rows_total,
            "materialized feature table"
        );

        Ok(BuildReport {
            table: name.to_string(),
            rows_written,
            rows_total,
        })
    }

    async fn register_dimension(&self, name: &str, entity_key: &str) -> Result<()> {
        let mut inner = self.inner.write().await;

        if inner.features.contains_key(name) {
            return Err(StoreError::TableKindConflict(name.to_string()));
        }
        let rows = inner
            .sources
            .get(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))?;
        for row in rows {
            if !row.contains_key(entity_key) {
                return Err(StoreError::MissingColumn {
                    table: name.to_string(),
                    column: entity_key.to_string(),
                });
            }
        }

        tracing::info!(table = name, entity_key, "registered dimension table");
        inner
            .dimensions
            .insert(name.to_string(), entity_key.to_string());
        Ok(())
    }

    async fn describe(&self, name: &str) -> Result<TableInfo> {
        let inner = self.inner.read().await;

        if let Some(state) = inner.features.get(name) {
            return Ok(TableInfo {
                name: name.to_string(),
                kind: TableKind::Feature,
                entity_key: Some(state.keys.entity_key.clone()),
                timestamp_key: Some(state.keys.timestamp_key.clone()),
                columns: state.columns.clone(),
            });
        }

        if let Some(rows) = inner.sources.get(name) {
            let mut columns: Vec<String> = rows
                .iter()
                .flat_map(|r| r.keys().cloned())
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            columns.sort();

            let (kind, entity_key) = match inner.dimensions.get(name) {
                Some(key) => (TableKind::Dimension, Some(key.clone())),
                None => (TableKind::Source, None),
            };
            return Ok(TableInfo {
                name: name.to_string(),
                kind,
                entity_key,
                timestamp_key: None,
                columns,
            });
        }

        Err(StoreError::UnknownTable(name.to_string()))
    }

    async fn lookup_as_of(
        &self,
        name: &str,
        entity: &Value,
        as_of: DateTime<Utc>,
        feature_names: &[String],
    ) -> Result<HashMap<String, Value>> {
        let inner = self.inner.read().await;
        let entity_key = encode_key(entity)?;

        if let Some(state) = inner.features.get(name) {
            // Latest row at or before as_of for this entity; strictly
            // newer rows must never be visible here.
            let lower = (entity_key.clone(), DateTime::<Utc>::MIN_UTC);
            let upper = (entity_key, as_of);
            let found = state.rows.range(lower..=upper).next_back();

            let values = match found {
                Some((_, row)) => feature_names
                    .iter()
                    .map(|f| (f.clone(), row.get(f).cloned().unwrap_or(Value::Null)))
                    .collect(),
                None => feature_names
                    .iter()
                    .map(|f| (f.clone(), Value::Null))
                    .collect(),
            };
            return Ok(values);
        }

        if let Some(dim_key) = inner.dimensions.get(name) {
            let rows = inner
                .sources
                .get(name)
                .ok_or_else(|| StoreError::UnknownTable(name.to_string()))?;

            let found = rows.iter().find(|row| {
                row.get(dim_key)
                    .and_then(|v| encode_key(v).ok())
                    .as_deref()
                    == Some(entity_key.as_str())
            });

            let values = match found {
                Some(row) => feature_names
                    .iter()
                    .map(|f| (f.clone(), row.get(f).cloned().unwrap_or(Value::Null)))
                    .collect(),
                None => feature_names
                    .iter()
                    .map(|f| (f.clone(), Value::Null))
                    .collect(),
            };
            return Ok(values);
        }

        if inner.sources.contains_key(name) {
            Err(StoreError::NotRegistered(name.to_string()))
        } else {
            Err(StoreError::UnknownTable(name.to_string()))
        }
    }

    async fn feature_rows(&self, name: &str) -> Result<Vec<FeatureRow>> {
        let inner = self.inner.read().await;
        let state = inner
            .features
            .get(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))?;

        Ok(state
            .rows
            .iter()
            .map(|((entity, ts), values)| {
                FeatureRow::new(Value::String(entity.clone()), *ts, values.clone())
            })
            .collect())
    }
}
