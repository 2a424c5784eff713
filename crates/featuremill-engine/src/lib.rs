//! Featuremill Engine - feature computation and training-set assembly
//!
//! Two responsibilities live here:
//! - computing derived feature rows (windowed growth ratios, trailing
//!   event counts) per entity per month bucket from raw source rows;
//! - assembling training sets by point-in-time (as-of) joining a label
//!   frame against feature tables through the `FeatureStore` trait.

pub mod assembler;
pub mod bucket;
pub mod compute;
pub mod error;

// Re-export main types
pub use assembler::{create_training_set, FeatureLookup, TrainingSet};
pub use bucket::{bucket_stamp, month_index};
pub use compute::compute_feature_table;
pub use error::{EngineError, Result};
