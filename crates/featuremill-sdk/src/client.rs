//! The high-level feature client
//!
//! `FeatureClient` drives every spec-declared operation: loading source
//! tables, building and materializing feature tables, registering
//! dimension tables, and assembling training sets. The store is injected
//! at construction, so nothing here touches ambient globals.

use crate::builder::FeatureClientBuilder;
use crate::error::{ClientError, Result};
use featuremill_core::{FeatureSpec, Frame, Row};
use featuremill_engine::{compute_feature_table, create_training_set, FeatureLookup, TrainingSet};
use featuremill_store::{BuildReport, FeatureStore, InMemoryStore, TableKeys, WriteMode};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Spec-driven feature-store client
pub struct FeatureClient {
    spec: FeatureSpec,
    store: Arc<dyn FeatureStore>,
}

impl FeatureClient {
    pub(crate) fn new(spec: FeatureSpec, store: Arc<dyn FeatureStore>) -> Self {
        Self { spec, store }
    }

    /// Start building a client
    pub fn builder() -> FeatureClientBuilder {
        FeatureClientBuilder::new()
    }

    /// The validated spec this client was built from
    pub fn spec(&self) -> &FeatureSpec {
        &self.spec
    }

    /// The injected store backend
    pub fn store(&self) -> Arc<dyn FeatureStore> {
        Arc::clone(&self.store)
    }

    /// Load raw rows for a spec-declared source table
    pub async fn load_source_table(&self, name: &str, rows: Vec<Row>) -> Result<()> {
        if self.spec.source_table(name).is_none() {
            return Err(ClientError::UnknownSpecTable(name.to_string()));
        }
        self.store.load_source(name, rows).await?;
        Ok(())
    }

    /// Compute and materialize one spec-declared feature table
    ///
    /// With `drop_existing=false` the build is an incremental upsert:
    /// existing history not covered by the computed rows is preserved,
    /// and re-running with identical input is idempotent. With
    /// `drop_existing=true` the table is recreated from scratch.
    pub async fn build_feature_table(
        &self,
        name: &str,
        drop_existing: bool,
    ) -> Result<BuildReport> {
        let table = self
            .spec
            .feature_table(name)
            .ok_or_else(|| ClientError::UnknownSpecTable(name.to_string()))?;
        let source = self
            .spec
            .source_table(&table.source)
            .ok_or_else(|| ClientError::UnknownSpecTable(table.source.clone()))?;

        let source_rows = self.store.source_rows(&source.name).await?;
        let rows = compute_feature_table(table, source, &source_rows)?;

        let report = self
            .store
            .materialize(
                name,
                &TableKeys::new(table.entity_key.as_str(), table.timestamp_key.as_str()),
                rows,
                WriteMode::from_drop_existing(drop_existing),
            )
            .await?;

        tracing::info!(
            table = name,
            drop_existing,
            rows_total = report.rows_total,
            "built feature table"
        );
        Ok(report)
    }

    /// Register a spec-declared dimension table for entity-keyed lookups
    pub async fn register_dimension_table(&self, name: &str) -> Result<()> {
        let dim = self
            .spec
            .dimension_table(name)
            .ok_or_else(|| ClientError::UnknownSpecTable(name.to_string()))?;
        self.store.register_dimension(name, &dim.entity_key).await?;
        Ok(())
    }

    /// The feature lookups the spec implies for training-set assembly:
    /// every feature table's output columns plus every dimension table's
    /// declared feature columns, keyed by the label table's columns.
    pub fn default_lookups(&self) -> Result<Vec<FeatureLookup>> {
        let label = self.spec.label.as_ref().ok_or(ClientError::NoLabelSpec)?;
        let mut lookups = Vec::new();

        for table in &self.spec.feature_tables {
            lookups.push(
                FeatureLookup::new(
                    table.name.as_str(),
                    table.output_columns(),
                    label.entity_key.as_str(),
                )
                .with_timestamp_lookup_key(label.timestamp_key.as_str()),
            );
        }
        for dim in &self.spec.dimension_tables {
            if !dim.features.is_empty() {
                lookups.push(FeatureLookup::new(
                    dim.name.as_str(),
                    dim.features.clone(),
                    label.entity_key.as_str(),
                ));
            }
        }
        Ok(lookups)
    }

    /// Read the spec's label table into a frame
    pub async fn label_frame(&self) -> Result<Frame> {
        let label = self.spec.label.as_ref().ok_or(ClientError::NoLabelSpec)?;
        let rows = self.store.source_rows(&label.table).await?;

        // Key columns first, remaining columns in sorted order
        let mut columns = vec![
            label.entity_key.clone(),
            label.timestamp_key.clone(),
            label.label_column.clone(),
        ];
        let extra: BTreeSet<String> = rows
            .iter()
            .flat_map(|r| r.keys().cloned())
            .filter(|c| !columns.contains(c))
            .collect();
        columns.extend(extra);

        Ok(Frame::from_rows(columns, rows)?)
    }

    /// Build the flat exploratory training frame straight from the spec
    ///
    /// Features are computed into a scratch store, never touching tables
    /// materialized through [`build_feature_table`]. The result is for
    /// ad-hoc exploration; production training sets should join against
    /// the persisted feature tables via [`create_training_set`].
    pub async fn build_training_data_set(&self) -> Result<Frame> {
        let label = self.spec.label.as_ref().ok_or(ClientError::NoLabelSpec)?;

        let scratch: Arc<dyn FeatureStore> = Arc::new(InMemoryStore::new());
        for table in &self.spec.feature_tables {
            let source = self
                .spec
                .source_table(&table.source)
                .ok_or_else(|| ClientError::UnknownSpecTable(table.source.clone()))?;
            let source_rows = self.store.source_rows(&source.name).await?;
            let rows = compute_feature_table(table, source, &source_rows)?;
            scratch
                .materialize(
                    &table.name,
                    &TableKeys::new(table.entity_key.as_str(), table.timestamp_key.as_str()),
                    rows,
                    WriteMode::Overwrite,
                )
                .await?;
        }
        for dim in &self.spec.dimension_tables {
            let rows = self.store.source_rows(&dim.name).await?;
            scratch.load_source(&dim.name, rows).await?;
            scratch.register_dimension(&dim.name, &dim.entity_key).await?;
        }

        let label_frame = self.label_frame().await?;
        let lookups = self.default_lookups()?;
        let training_set =
            create_training_set(scratch, label_frame, lookups, label.label_column.as_str())
                .await?;
        let df = training_set.load_df().await?;

        tracing::info!(rows = df.len(), "built exploratory training data set");
        Ok(df)
    }

    /// Assemble a training set against materialized feature tables
    pub async fn create_training_set(
        &self,
        label_frame: Frame,
        lookups: Vec<FeatureLookup>,
        label_column: &str,
    ) -> Result<TrainingSet> {
        let training_set = create_training_set(
            Arc::clone(&self.store),
            label_frame,
            lookups,
            label_column,
        )
        .await?;
        Ok(training_set)
    }
}
