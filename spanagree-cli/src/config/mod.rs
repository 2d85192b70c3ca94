//! Configuration module
//!
//! The CLI reads the same TOML settings file as the library, plus a
//! `[performance]` table of its own. Command-line flags win over the file.

use crate::error::CliError;
use crate::input::FileReader;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spanagree_core::{ScoringConfig, Settings};
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    /// Library settings (`[scoring]`, `[repair]`, `[batch]`, `[output]`)
    #[serde(flatten)]
    pub settings: Settings,

    /// Performance configuration
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Performance-related configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,
}

impl CliConfig {
    /// Load configuration from `path`, or defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let source = FileReader::read_text(path)?;
        Self::from_toml_str(&source)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Parse and validate configuration from TOML
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: CliConfig =
            toml::from_str(source).map_err(|e| CliError::ConfigError(e.to_string()))?;
        config
            .settings
            .scoring
            .validate()
            .map_err(CliError::from)?;
        Ok(config)
    }

    /// Scoring policy with command-line overrides applied
    pub fn scoring(
        &self,
        threshold: Option<f64>,
        require_label_match: bool,
    ) -> Result<ScoringConfig> {
        let base = self.settings.scoring;
        ScoringConfig::builder()
            .overlap_threshold(threshold.unwrap_or(base.overlap_threshold))
            .require_label_match(require_label_match || base.require_label_match)
            .build()
            .map_err(|e| CliError::from(e).into())
    }

    /// Worker threads to use, preferring the command line, then the file,
    /// then the number of CPUs
    pub fn worker_threads(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|&n| n > 0)
            .or(Some(self.performance.worker_threads).filter(|&n| n > 0))
            .unwrap_or_else(num_cpus::get)
    }
}
