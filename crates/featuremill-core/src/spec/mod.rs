//! Feature specification definitions
//!
//! These types form the declarative spec that drives every Featuremill
//! build: which source tables exist, which feature tables are derived
//! from them (and how), which tables are time-invariant dimensions, and
//! which table carries the training labels.

pub mod derivation;
pub mod table;

pub use derivation::{Derivation, PartialWindowPolicy, TrailingCount, WindowedGrowth};
pub use table::{
    DimensionTableSpec, FeatureDefinition, FeatureSpec, FeatureTableSpec, LabelSpec,
    SourceTableSpec,
};
