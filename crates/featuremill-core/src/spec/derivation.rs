//! Feature derivation configuration
//!
//! A derivation declares how a feature table's columns are computed from
//! a raw source table. The windowing semantics (window length set,
//! partial-window handling) are configuration, never hardcoded: one spec
//! may derive growth over 6-month windows only, another over 3 and 6.

use serde::{Deserialize, Serialize};

/// How to treat a time bucket whose trailing window reaches past the
/// start of an entity's history
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PartialWindowPolicy {
    /// Emit the row with a null feature value (default)
    #[default]
    Null,
    /// Drop the row entirely
    Drop,
}

/// Percentage growth of an aggregated metric over trailing windows
///
/// For bucket `t` and window length `N` (in months), the output is
/// `(value(t) - value(t - N)) / value(t - N)`. A missing or zero base
/// value falls under the partial-window policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowedGrowth {
    /// Source column holding the raw metric (summed per month bucket)
    pub source_column: String,

    /// Trailing window lengths in months, one output column per length
    pub window_lengths: Vec<u32>,

    #[serde(default)]
    pub partial_windows: PartialWindowPolicy,
}

/// Count of source events within a trailing window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrailingCount {
    /// Trailing window length in months
    pub window_length: u32,
}

/// Feature derivation loaded from the YAML spec
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "derivation", rename_all = "snake_case")]
pub enum Derivation {
    WindowedGrowth(WindowedGrowth),
    TrailingCount(TrailingCount),
}

impl Derivation {
    /// Deterministic output column names for a feature with this derivation
    ///
    /// Growth features produce one column per window length, named
    /// `<feature>_window_length_<N>`; counts produce a single column named
    /// after the feature itself.
    pub fn output_columns(&self, feature_name: &str) -> Vec<String> {
        match self {
            Derivation::WindowedGrowth(growth) => growth
                .window_lengths
                .iter()
                .map(|n| format!("{}_window_length_{}", feature_name, n))
                .collect(),
            Derivation::TrailingCount(_) => vec![feature_name.to_string()],
        }
    }

    /// Validate derivation-specific requirements
    pub fn validate(&self, feature_name: &str) -> Result<(), String> {
        match self {
            Derivation::WindowedGrowth(growth) => {
                if growth.source_column.is_empty() {
                    return Err(format!(
                        "Feature '{}': source_column cannot be empty for windowed_growth",
                        feature_name
                    ));
                }
                if growth.window_lengths.is_empty() {
                    return Err(format!(
                        "Feature '{}': windowed_growth requires at least one window length",
                        feature_name
                    ));
                }
                if growth.window_lengths.contains(&0) {
                    return Err(format!(
                        "Feature '{}': window lengths must be positive",
                        feature_name
                    ));
                }
            }
            Derivation::TrailingCount(count) => {
                if count.window_length == 0 {
                    return Err(format!(
                        "Feature '{}': trailing_count window length must be positive",
                        feature_name
                    ));
                }
            }
        }
        Ok(())
    }
}
