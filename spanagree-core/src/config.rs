//! Engine configuration
//!
//! Configuration is an explicit value handed to the matcher and the metrics
//! calculator when they are built. Settings files use TOML with one table
//! per concern; every key is optional.

use crate::error::{Result, SpanAgreeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration constants
pub mod defaults {
    /// Any positive overlap is enough for a match
    pub const OVERLAP_THRESHOLD: f64 = 0.0;

    /// Matching is position-only unless asked otherwise
    pub const REQUIRE_LABEL_MATCH: bool = false;

    /// Upper bound on error messages kept by batch reports
    pub const MAX_REPORTED_ERRORS: usize = 50;
}

/// Policy knobs for the overlap matcher
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum share of the shorter span that must be covered by the
    /// intersection. `0.0` accepts any positive-length overlap.
    pub overlap_threshold: f64,

    /// Require the two spans to share at least one label
    pub require_label_match: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: defaults::OVERLAP_THRESHOLD,
            require_label_match: defaults::REQUIRE_LABEL_MATCH,
        }
    }
}

impl ScoringConfig {
    /// Create a configuration builder
    pub fn builder() -> ScoringConfigBuilder {
        ScoringConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.overlap_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.overlap_threshold)
        {
            return Err(SpanAgreeError::Config(format!(
                "overlap_threshold must be within [0, 1], got {}",
                self.overlap_threshold
            )));
        }

        Ok(())
    }
}

/// Fluent builder for [`ScoringConfig`]
#[derive(Debug, Default)]
pub struct ScoringConfigBuilder {
    overlap_threshold: Option<f64>,
    require_label_match: Option<bool>,
}

impl ScoringConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fractional overlap threshold
    pub fn overlap_threshold(mut self, threshold: f64) -> Self {
        self.overlap_threshold = Some(threshold);
        self
    }

    /// Require label agreement for a match
    pub fn require_label_match(mut self, required: bool) -> Self {
        self.require_label_match = Some(required);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ScoringConfig> {
        let mut config = ScoringConfig::default();

        if let Some(threshold) = self.overlap_threshold {
            config.overlap_threshold = threshold;
        }

        if let Some(required) = self.require_label_match {
            config.require_label_match = required;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Position repair settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Maximum number of error messages kept in a report
    pub max_reported_errors: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_reported_errors: defaults::MAX_REPORTED_ERRORS,
        }
    }
}

/// Settings for batch passes over stored metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of error messages kept in a report
    pub max_reported_errors: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_reported_errors: defaults::MAX_REPORTED_ERRORS,
        }
    }
}

/// Output settings used by batch tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Pretty print JSON output
    pub pretty_json: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { pretty_json: true }
    }
}

/// Complete settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Matching policy
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Repair tooling
    #[serde(default)]
    pub repair: RepairConfig,

    /// Recalculation of stored metrics
    #[serde(default)]
    pub batch: BatchConfig,

    /// Output formatting
    #[serde(default)]
    pub output: OutputSettings,
}

impl Settings {
    /// Parse and validate settings from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(source)?;
        settings.scoring.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| SpanAgreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_position_only_any_overlap() {
        let config = ScoringConfig::default();
        assert_eq!(config.overlap_threshold, 0.0);
        assert!(!config.require_label_match);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_out_of_range_threshold() {
        assert!(ScoringConfig::builder().overlap_threshold(1.5).build().is_err());
        assert!(ScoringConfig::builder().overlap_threshold(-0.1).build().is_err());
        assert!(ScoringConfig::builder()
            .overlap_threshold(f64::NAN)
            .build()
            .is_err());

        let config = ScoringConfig::builder()
            .overlap_threshold(0.5)
            .require_label_match(true)
            .build()
            .unwrap();
        assert_eq!(config.overlap_threshold, 0.5);
        assert!(config.require_label_match);
    }

    #[test]
    fn test_settings_sections_default_independently() {
        let settings = Settings::from_toml_str(
            r#"
[scoring]
require_label_match = true
"#,
        )
        .unwrap();

        assert!(settings.scoring.require_label_match);
        assert_eq!(settings.scoring.overlap_threshold, 0.0);
        assert_eq!(
            settings.repair.max_reported_errors,
            defaults::MAX_REPORTED_ERRORS
        );
        assert!(settings.output.pretty_json);
    }

    #[test]
    fn test_repair_and_batch_bounds_are_separate() {
        let settings = Settings::from_toml_str("[batch]\nmax_reported_errors = 3\n").unwrap();
        assert_eq!(settings.batch.max_reported_errors, 3);
        assert_eq!(
            settings.repair.max_reported_errors,
            defaults::MAX_REPORTED_ERRORS
        );
    }

    #[test]
    fn test_settings_empty_document() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_validation_runs_after_parse() {
        let result = Settings::from_toml_str("[scoring]\noverlap_threshold = 2.0\n");
        assert!(matches!(result, Err(SpanAgreeError::Config(_))));
    }

    #[test]
    fn test_settings_type_errors_surface_as_toml_errors() {
        let result = Settings::from_toml_str("[scoring]\nrequire_label_match = \"yes\"\n");
        assert!(matches!(result, Err(SpanAgreeError::Toml(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Settings::from_file("/nonexistent/spanagree.toml");
        assert!(matches!(result, Err(SpanAgreeError::Io { .. })));
    }
}
