//! Featuremill SDK
//!
//! High-level API for spec-driven feature-table builds and training-set
//! assembly. The `FeatureClient` ties the pieces together: it loads a
//! validated spec, drives the compute engine, materializes feature
//! tables through an injected `FeatureStore`, and assembles
//! point-in-time-correct training frames.

pub mod builder;
pub mod client;
pub mod error;

// Re-export main types
pub use builder::FeatureClientBuilder;
pub use client::FeatureClient;
pub use error::{ClientError, Result};

// Re-export commonly used types from dependencies
pub use featuremill_core::{FeatureRow, FeatureSpec, Frame, Row, Value};
pub use featuremill_engine::{FeatureLookup, TrainingSet};
pub use featuremill_store::{BuildReport, FeatureStore, InMemoryStore, WriteMode};
