//! Spec loading and validation
//!
//! `SpecLoader` turns YAML text (or a file) into a validated
//! `FeatureSpec`. Parsing and validation are one step: a spec that
//! parses but references a table it never declares is rejected here.

use crate::error::{Result, SpecError};
use featuremill_core::FeatureSpec;
use std::path::Path;

/// Spec loader utilities
pub struct SpecLoader;

impl SpecLoader {
    /// Parse and validate a spec from YAML text
    pub fn from_str(yaml: &str) -> Result<FeatureSpec> {
        let spec: FeatureSpec = serde_yaml::from_str(yaml)?;
        spec.validate().map_err(SpecError::Validation)?;
        log::debug!(
            "loaded spec version {}",
            spec.version.as_deref().unwrap_or("unversioned")
        );
        Ok(spec)
    }

    /// Parse and validate a spec from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<FeatureSpec> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }
}
