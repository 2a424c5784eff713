//! Featuremill Core - Core types and definitions for the Featuremill feature store
//!
//! This crate provides the fundamental types used across the Featuremill ecosystem:
//! - Value types for tabular data
//! - Frame/row types for in-memory datasets
//! - Feature specification (spec) definitions loaded from YAML
//! - Error types

pub mod error;
pub mod spec;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use spec::{
    Derivation, DimensionTableSpec, FeatureDefinition, FeatureSpec, FeatureTableSpec, LabelSpec,
    PartialWindowPolicy, SourceTableSpec, TrailingCount, WindowedGrowth,
};
pub use types::{FeatureRow, Frame, Row, Value};
