//! Builder pattern for FeatureClient

use crate::client::FeatureClient;
use crate::error::{ClientError, Result};
use featuremill_spec::SpecLoader;
use featuremill_store::{FeatureStore, InMemoryStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for [`FeatureClient`]
///
/// # Example
///
/// ```rust,ignore
/// use featuremill_sdk::FeatureClientBuilder;
///
/// // From a spec file, with the embedded in-memory store
/// let client = FeatureClientBuilder::new()
///     .with_spec_file("features.yaml")
///     .build()?;
///
/// // Spec content directly, custom store backend
/// let client = FeatureClientBuilder::new()
///     .with_spec_content(yaml)
///     .with_store(store)
///     .build()?;
/// ```
pub struct FeatureClientBuilder {
    spec_file: Option<PathBuf>,
    spec_content: Option<String>,
    store: Option<Arc<dyn FeatureStore>>,
}

impl FeatureClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            spec_file: None,
            spec_content: None,
            store: None,
        }
    }

    /// Load the feature spec from a YAML file
    pub fn with_spec_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec_file = Some(path.into());
        self
    }

    /// Provide the feature spec as YAML content directly
    pub fn with_spec_content(mut self, content: impl Into<String>) -> Self {
        self.spec_content = Some(content.into());
        self
    }

    /// Inject the store backend. Defaults to an empty [`InMemoryStore`].
    pub fn with_store(mut self, store: Arc<dyn FeatureStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the client, loading and validating the spec
    pub fn build(self) -> Result<FeatureClient> {
        let spec = match (self.spec_file, self.spec_content) {
            (Some(path), _) => SpecLoader::from_file(path)?,
            (None, Some(content)) => SpecLoader::from_str(&content)?,
            (None, None) => {
                return Err(ClientError::Configuration(
                    "a spec file or spec content is required".to_string(),
                ))
            }
        };

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));

        tracing::info!(
            feature_tables = spec.feature_tables.len(),
            dimension_tables = spec.dimension_tables.len(),
            "built feature client"
        );
        Ok(FeatureClient::new(spec, store))
    }
}

impl Default for FeatureClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
