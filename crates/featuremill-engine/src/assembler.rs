//! Training-set assembly (as-of join)
//!
//! Joins a label frame against feature and dimension tables through the
//! `FeatureStore` trait. For every label row and every lookup the result
//! carries the most recent feature value at or before the label's
//! observation timestamp; a feature value computed after the observation
//! must never appear in a training row (label leakage).

use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use featuremill_core::{Frame, Row, Value};
use featuremill_store::{FeatureStore, TableKind};
use std::collections::HashSet;
use std::sync::Arc;

/// One feature-table lookup specification
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLookup {
    /// Feature or dimension table to read from
    pub table_name: String,
    /// Feature columns to pull
    pub feature_names: Vec<String>,
    /// Label-frame column holding the entity key
    pub lookup_key: String,
    /// Label-frame column holding the observation timestamp.
    /// Ignored for dimension tables, required for feature tables.
    pub timestamp_lookup_key: Option<String>,
}

impl FeatureLookup {
    pub fn new(
        table_name: impl Into<String>,
        feature_names: Vec<String>,
        lookup_key: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            feature_names,
            lookup_key: lookup_key.into(),
            timestamp_lookup_key: None,
        }
    }

    pub fn with_timestamp_lookup_key(mut self, column: impl Into<String>) -> Self {
        self.timestamp_lookup_key = Some(column.into());
        self
    }
}

/// A validated, lazily-loaded training set
pub struct TrainingSet {
    store: Arc<dyn FeatureStore>,
    label_frame: Frame,
    lookups: Vec<FeatureLookup>,
    label_column: String,
}

/// Validate lookups against the store and produce a `TrainingSet`
///
/// All reference errors (unknown table, unknown feature, missing key
/// column) surface here, before any join work happens.
pub async fn create_training_set(
    store: Arc<dyn FeatureStore>,
    label_frame: Frame,
    lookups: Vec<FeatureLookup>,
    label_column: impl Into<String>,
) -> Result<TrainingSet> {
    let label_column = label_column.into();
    if !label_frame.columns().iter().any(|c| *c == label_column) {
        return Err(EngineError::LabelColumnNotFound(label_column));
    }

    let mut requested: HashSet<&str> = HashSet::new();
    for lookup in &lookups {
        let info = store.describe(&lookup.table_name).await?;
        match info.kind {
            TableKind::Feature => {
                let ts_key = lookup
                    .timestamp_lookup_key
                    .as_deref()
                    .ok_or_else(|| EngineError::MissingTimestampKey(lookup.table_name.clone()))?;
                require_label_column(&label_frame, ts_key)?;
            }
            TableKind::Dimension => {}
            TableKind::Source => {
                return Err(EngineError::NotLookupTable(lookup.table_name.clone()))
            }
        }
        require_label_column(&label_frame, &lookup.lookup_key)?;

        for feature in &lookup.feature_names {
            if !info.has_column(feature) {
                return Err(EngineError::UnknownFeature {
                    table: lookup.table_name.clone(),
                    feature: feature.clone(),
                });
            }
            // A repeat across lookups would silently overwrite the
            // earlier value during assembly, so it fails here instead.
            if label_frame.columns().iter().any(|c| c == feature)
                || !requested.insert(feature.as_str())
            {
                return Err(EngineError::ColumnCollision(feature.clone()));
            }
        }
    }

    tracing::debug!(
        labels = label_frame.len(),
        lookups = lookups.len(),
        "created training set"
    );

    Ok(TrainingSet {
        store,
        label_frame,
        lookups,
        label_column,
    })
}

fn require_label_column(frame: &Frame, column: &str) -> Result<()> {
    if frame.columns().iter().any(|c| c == column) {
        Ok(())
    } else {
        Err(EngineError::MissingColumn {
            table: "label".to_string(),
            column: column.to_string(),
        })
    }
}

impl TrainingSet {
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Materialize the denormalized training frame
    pub async fn load_df(&self) -> Result<Frame> {
        let mut columns: Vec<String> = self.label_frame.columns().to_vec();
        for lookup in &self.lookups {
            columns.extend(lookup.feature_names.iter().cloned());
        }

        let mut out = Frame::new(columns);
        for label_row in self.label_frame.rows() {
            let mut row: Row = label_row.clone();

            for lookup in &self.lookups {
                let values = self.lookup_features(label_row, lookup).await?;
                row.extend(values);
            }

            out.push_row(row)
                .map_err(|e| EngineError::Assembly(e.to_string()))?;
        }

        tracing::info!(rows = out.len(), "loaded training frame");
        Ok(out)
    }

    async fn lookup_features(
        &self,
        label_row: &Row,
        lookup: &FeatureLookup,
    ) -> Result<Vec<(String, Value)>> {
        let entity = label_row.get(&lookup.lookup_key).unwrap_or(&Value::Null);

        // A null entity key cannot match any feature row: all nulls.
        if entity.is_null() {
            return Ok(lookup
                .feature_names
                .iter()
                .map(|f| (f.clone(), Value::Null))
                .collect());
        }

        let as_of = match lookup.timestamp_lookup_key.as_deref() {
            Some(ts_key) => {
                let cell = label_row.get(ts_key).unwrap_or(&Value::Null);
                cell.as_timestamp()
                    .ok_or_else(|| EngineError::TypeMismatch {
                        table: "label".to_string(),
                        column: ts_key.to_string(),
                        expected: "timestamp".to_string(),
                        actual: cell.type_name().to_string(),
                    })?
            }
            // Dimension-only lookup: the bound is irrelevant
            None => DateTime::<Utc>::MAX_UTC,
        };

        let values = self
            .store
            .lookup_as_of(&lookup.table_name, entity, as_of, &lookup.feature_names)
            .await?;

        Ok(lookup
            .feature_names
            .iter()
            .map(|f| (f.clone(), values.get(f).cloned().unwrap_or(Value::Null)))
            .collect())
    }
}
