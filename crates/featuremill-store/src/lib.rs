//! Featuremill Store - storage abstraction and table materializer
//!
//! This crate owns the persistence seam of Featuremill. The as-of join
//! and the build orchestration are written against the [`FeatureStore`]
//! trait; [`InMemoryStore`] is the embedded implementation used for
//! tests and exploration, and the trait is the integration point for a
//! production tabular backend.

pub mod error;
pub mod key;
pub mod memory;
pub mod store;

// Re-export main types
pub use error::{Result, StoreError};
pub use key::encode_key;
pub use memory::InMemoryStore;
pub use store::{BuildReport, FeatureStore, TableInfo, TableKeys, TableKind, WriteMode};
