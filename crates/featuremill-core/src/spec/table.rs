//! Table-level spec definitions
//!
//! A `FeatureSpec` is the whole declarative document: raw source tables,
//! derived feature tables, time-invariant dimension tables, and the label
//! table used for training-set assembly.

use crate::spec::Derivation;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A raw fact or lookup table the spec reads from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceTableSpec {
    /// Table name (unique identifier)
    pub name: String,

    /// Entity key column (e.g. customer_id)
    pub entity_key: String,

    /// Event timestamp column, absent for time-invariant tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_key: Option<String>,
}

/// One derived feature within a feature table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureDefinition {
    /// Feature name (unique within its table; prefixes the output columns)
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// How the feature values are computed
    #[serde(flatten)]
    pub derivation: Derivation,
}

impl FeatureDefinition {
    /// Deterministic output column names for this feature
    pub fn output_columns(&self) -> Vec<String> {
        self.derivation.output_columns(&self.name)
    }

    /// Validate the feature definition
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Feature name cannot be empty".to_string());
        }
        self.derivation.validate(&self.name)
    }
}

/// A derived, persisted feature table keyed by (entity, observation time)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureTableSpec {
    /// Feature table name (unique identifier)
    pub name: String,

    /// Source table the features are derived from
    pub source: String,

    /// Entity key column of both source and feature table
    pub entity_key: String,

    /// Timestamp column of the materialized feature table
    pub timestamp_key: String,

    /// Derived features
    pub features: Vec<FeatureDefinition>,
}

impl FeatureTableSpec {
    /// All output columns of this table, in feature order
    pub fn output_columns(&self) -> Vec<String> {
        self.features
            .iter()
            .flat_map(|f| f.output_columns())
            .collect()
    }

    /// Validate this table spec
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Feature table name cannot be empty".to_string());
        }
        if self.source.is_empty() {
            return Err(format!("Feature table '{}': source cannot be empty", self.name));
        }
        if self.entity_key.is_empty() || self.timestamp_key.is_empty() {
            return Err(format!(
                "Feature table '{}': entity_key and timestamp_key are required",
                self.name
            ));
        }
        if self.features.is_empty() {
            return Err(format!(
                "Feature table '{}' declares no features",
                self.name
            ));
        }

        let mut names = HashSet::new();
        for feature in &self.features {
            feature.validate()?;
            if !names.insert(&feature.name) {
                return Err(format!(
                    "Feature table '{}': duplicate feature name '{}'",
                    self.name, feature.name
                ));
            }
        }

        let mut columns = HashSet::new();
        for column in self.output_columns() {
            if !columns.insert(column.clone()) {
                return Err(format!(
                    "Feature table '{}': duplicate output column '{}'",
                    self.name, column
                ));
            }
        }

        Ok(())
    }
}

/// A time-invariant dimension table, registered as-is (never rebuilt)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DimensionTableSpec {
    /// Name of the existing source table to register
    pub name: String,

    /// Entity key column for lookups
    pub entity_key: String,

    /// Columns exposed as features (documentation + lookup validation)
    #[serde(default)]
    pub features: Vec<String>,
}

impl DimensionTableSpec {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Dimension table name cannot be empty".to_string());
        }
        if self.entity_key.is_empty() {
            return Err(format!(
                "Dimension table '{}': entity_key is required",
                self.name
            ));
        }
        Ok(())
    }
}

/// The label table used for training-set assembly
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelSpec {
    /// Source table holding one row per observation event
    pub table: String,

    /// Entity key column
    pub entity_key: String,

    /// Observation timestamp column
    pub timestamp_key: String,

    /// Binary outcome column (e.g. commit)
    pub label_column: String,
}

/// Complete feature specification loaded from a YAML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSpec {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub source_tables: Vec<SourceTableSpec>,

    #[serde(default)]
    pub feature_tables: Vec<FeatureTableSpec>,

    #[serde(default)]
    pub dimension_tables: Vec<DimensionTableSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelSpec>,
}

impl FeatureSpec {
    /// Look up a feature table spec by name
    pub fn feature_table(&self, name: &str) -> Option<&FeatureTableSpec> {
        self.feature_tables.iter().find(|t| t.name == name)
    }

    /// Look up a dimension table spec by name
    pub fn dimension_table(&self, name: &str) -> Option<&DimensionTableSpec> {
        self.dimension_tables.iter().find(|t| t.name == name)
    }

    /// Look up a source table spec by name
    pub fn source_table(&self, name: &str) -> Option<&SourceTableSpec> {
        self.source_tables.iter().find(|t| t.name == name)
    }

    /// Validate the whole spec. All reference errors surface here, at
    /// load time, never at join time.
    pub fn validate(&self) -> Result<(), String> {
        let mut source_names = HashSet::new();
        for table in &self.source_tables {
            if table.name.is_empty() {
                return Err("Source table name cannot be empty".to_string());
            }
            if table.entity_key.is_empty() {
                return Err(format!(
                    "Source table '{}': entity_key is required",
                    table.name
                ));
            }
            if !source_names.insert(&table.name) {
                return Err(format!("Duplicate source table name: {}", table.name));
            }
        }

        let mut table_names: HashSet<&String> = source_names.clone();
        for table in &self.feature_tables {
            table.validate()?;
            if !table_names.insert(&table.name) {
                return Err(format!("Duplicate table name: {}", table.name));
            }
            if !source_names.contains(&table.source) {
                return Err(format!(
                    "Feature table '{}' references unknown source table '{}'",
                    table.name, table.source
                ));
            }
        }

        for table in &self.dimension_tables {
            table.validate()?;
            if !source_names.contains(&table.name) {
                return Err(format!(
                    "Dimension table '{}' is not a declared source table",
                    table.name
                ));
            }
        }

        if let Some(label) = &self.label {
            if !source_names.contains(&label.table) {
                return Err(format!(
                    "Label spec references unknown source table '{}'",
                    label.table
                ));
            }
            if label.label_column.is_empty() {
                return Err("Label spec: label_column is required".to_string());
            }
        }

        log::debug!(
            "validated spec: {} source, {} feature, {} dimension tables",
            self.source_tables.len(),
            self.feature_tables.len(),
            self.dimension_tables.len()
        );
        Ok(())
    }
}
