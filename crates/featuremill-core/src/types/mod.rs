//! Core data types for tabular feature data

pub mod frame;
pub mod value;

pub use frame::{FeatureRow, Frame, Row};
pub use value::Value;
