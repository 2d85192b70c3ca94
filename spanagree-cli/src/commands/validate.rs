//! Validate command implementation

use crate::config::CliConfig;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the settings file to validate
    #[arg(short, long, value_name = "FILE", required = true)]
    pub config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating settings: {}", self.config.display());

        match CliConfig::load(Some(&self.config)) {
            Ok(config) => {
                let settings = &config.settings;
                println!("✓ Settings are valid!");
                println!(
                    "  Overlap threshold:   {}",
                    settings.scoring.overlap_threshold
                );
                println!(
                    "  Require label match: {}",
                    settings.scoring.require_label_match
                );
                println!(
                    "  Repair error limit:  {}",
                    settings.repair.max_reported_errors
                );
                println!(
                    "  Batch error limit:   {}",
                    settings.batch.max_reported_errors
                );
                println!(
                    "  Worker threads:      {}",
                    config.worker_threads(None)
                );
                Ok(())
            }
            Err(e) => {
                println!("✗ Settings are invalid!");
                println!("  Error: {e:#}");
                Err(e.context("Validation failed"))
            }
        }
    }
}
