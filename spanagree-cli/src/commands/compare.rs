//! Compare command implementation

use crate::commands::init_logging;
use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{create_formatter, OutputFormat};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use spanagree_core::{evaluate_batch, summarize, ComparisonMetric};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Arguments for the compare command
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Annotated text files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Settings file
    #[arg(short, long, value_name = "FILE", env = "SPANAGREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Minimum overlap, as a share of the shorter span, for a match
    #[arg(long, value_name = "RATIO")]
    pub threshold: Option<f64>,

    /// Only match spans that share a label
    #[arg(long)]
    pub require_label_match: bool,

    /// Job identifier stamped on every record
    #[arg(long, value_name = "ID")]
    pub job_id: Option<String>,

    /// Append per-model mean and standard deviation
    #[arg(short, long)]
    pub summary: bool,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short, long, value_name = "COUNT")]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CompareArgs {
    /// Execute the compare command
    pub fn execute(&self) -> Result<()> {
        init_logging(self.verbose, self.quiet);
        log::debug!("Arguments: {:?}", self);

        let config = CliConfig::load(self.config.as_deref())?;
        let scoring = config.scoring(self.threshold, self.require_label_match)?;
        let files = resolve_patterns(&self.input)?;

        let threads = config.worker_threads(self.threads);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to create thread pool")?;
        log::info!(
            "Scoring {} file(s) with {} thread(s), overlap threshold {}, label match {}",
            files.len(),
            threads,
            scoring.overlap_threshold,
            scoring.require_label_match
        );

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(files.len() as u64);

        let mut metrics: Vec<ComparisonMetric> = Vec::new();
        for path in &files {
            let texts = FileReader::read_texts(path)?;
            let job_id = self.job_id.as_deref();
            metrics.extend(pool.install(|| evaluate_batch(&texts, job_id, &scoring)));
            progress.file_completed(&path.display().to_string());
        }
        progress.finish();

        let writer = self.open_output()?;
        let mut formatter = create_formatter(self.format, writer, config.settings.output.pretty_json);
        for metric in &metrics {
            formatter.format_metric(metric)?;
        }
        if self.summary {
            formatter.format_summary(&summarize(&metrics))?;
        }
        formatter.finish()?;

        log::info!("Wrote {} comparison(s)", metrics.len());
        Ok(())
    }

    fn open_output(&self) -> Result<Box<dyn Write + Send + Sync>> {
        match &self.output {
            Some(path) => {
                if path.is_dir() {
                    return Err(
                        CliError::OutputError(format!("{} is a directory", path.display())).into(),
                    );
                }
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output: {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(io::stdout())),
        }
    }
}
