//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use spanagree_core::config::defaults;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        if self.output.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        fs::write(&self.output, generate_template())
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Settings template written to {}", self.output.display());
        println!();
        println!("Next steps:");
        println!("1. Edit the file to choose a matching policy");
        println!("2. Validate it:");
        println!("   spanagree validate -c {}", self.output.display());
        println!("3. Use it for scoring:");
        println!(
            "   spanagree compare -i texts.json -c {}",
            self.output.display()
        );

        Ok(())
    }
}

/// Commented settings file holding the default values
fn generate_template() -> String {
    format!(
        r#"# spanagree settings

[scoring]
# Minimum overlap for two spans to match, as a share of the shorter span.
# 0.0 accepts any overlap of at least one character. Range: 0.0 - 1.0
overlap_threshold = {threshold:.1}

# Only match spans that share at least one label
require_label_match = {labels}

[repair]
# Error messages kept in repair reports
max_reported_errors = {max_errors}

[batch]
# Error messages kept in recalculation reports
max_reported_errors = {max_errors}

[output]
# Pretty print JSON output
pretty_json = true

[performance]
# Number of worker threads (0 = number of CPUs)
worker_threads = 0
"#,
        threshold = defaults::OVERLAP_THRESHOLD,
        labels = defaults::REQUIRE_LABEL_MATCH,
        max_errors = defaults::MAX_REPORTED_ERRORS,
    )
}
