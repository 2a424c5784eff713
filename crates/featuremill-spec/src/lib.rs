//! Featuremill Spec - YAML loader for feature specifications
//!
//! This crate parses declarative YAML feature specifications into the
//! `featuremill-core` spec AST and validates them at load time, so that
//! reference errors (unknown tables, missing key columns, bad window
//! sets) never survive to build or join time.

pub mod error;
pub mod loader;

// Re-export main types
pub use error::{Result, SpecError};
pub use loader::SpecLoader;
