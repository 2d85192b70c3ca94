//! Repair command implementation

use crate::commands::{init_logging, print_errors};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use spanagree_core::{repair_texts, save_text_file, RepairReport};
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the repair command
#[derive(Debug, Args)]
pub struct RepairArgs {
    /// Annotated text files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for corrected files (default: rewrite inputs in place)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Settings file
    #[arg(short, long, value_name = "FILE", env = "SPANAGREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl RepairArgs {
    /// Execute the repair command
    pub fn execute(&self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        let report = self.run()?;

        if self.dry_run {
            println!("Dry run, no files written");
        }
        println!("Checked:   {}", report.checked);
        println!("Fixed:     {}", report.fixed);
        println!("Unchanged: {}", report.unchanged);
        println!("Failed:    {}", report.failed);
        print_errors(&report.errors, report.suppressed_errors());
        Ok(())
    }

    fn run(&self) -> Result<RepairReport> {
        let config = CliConfig::load(self.config.as_deref())?;
        let files = resolve_patterns(&self.input)?;
        if let Some(dir) = &self.output {
            if !self.dry_run {
                prepare_output_dir(dir)?;
            }
        }

        let repair_config = config.settings.repair;
        let pretty = config.settings.output.pretty_json;
        let mut total = RepairReport::default();
        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(files.len() as u64);

        for path in &files {
            let mut file = FileReader::read_text_file(path)?;
            let report = repair_texts(file.texts_mut(), &repair_config);
            let fixed = report.fixed;
            total.absorb(
                report,
                &path.display().to_string(),
                repair_config.max_reported_errors,
            );

            if let Some(target) = self.target_for(path, fixed) {
                save_text_file(&target, &file, pretty)
                    .with_context(|| format!("Failed to write texts: {}", target.display()))?;
                log::info!("Wrote {} ({} span(s) fixed)", target.display(), fixed);
            }
            progress.file_completed(&path.display().to_string());
        }
        progress.finish();

        Ok(total)
    }

    /// Where the repaired copy of `path` goes, if anywhere. Inputs are only
    /// rewritten in place when something changed; an output directory
    /// receives every file so it holds the complete set.
    fn target_for(&self, path: &Path, fixed: usize) -> Option<PathBuf> {
        if self.dry_run {
            return None;
        }
        match &self.output {
            Some(dir) => path.file_name().map(|name| dir.join(name)),
            None if fixed > 0 => Some(path.to_path_buf()),
            None => None,
        }
    }
}

fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(CliError::OutputError(format!("{} is not a directory", dir.display())).into());
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}
