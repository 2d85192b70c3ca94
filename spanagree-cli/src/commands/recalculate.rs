//! Recalculate command implementation

use crate::commands::{init_logging, print_errors};
use crate::config::CliConfig;
use crate::input::{resolve_patterns, FileReader};
use anyhow::{Context, Result};
use clap::Args;
use spanagree_core::{recalculate_position_accuracy, save_metrics, BatchReport};
use std::path::PathBuf;

/// Arguments for the recalculate command
#[derive(Debug, Args)]
pub struct RecalculateArgs {
    /// Annotated text files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Stored metrics to update
    #[arg(short, long, value_name = "FILE", required = true)]
    pub metrics: PathBuf,

    /// Where to write updated metrics (default: overwrite the metrics file)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Settings file
    #[arg(short, long, value_name = "FILE", env = "SPANAGREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl RecalculateArgs {
    /// Execute the recalculate command
    pub fn execute(&self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        let report = self.run()?;

        println!("Processed: {}", report.processed);
        println!("Updated:   {}", report.updated);
        println!("Errors:    {}", report.errored);
        print_errors(&report.errors, report.suppressed_errors());
        Ok(())
    }

    fn run(&self) -> Result<BatchReport> {
        let config = CliConfig::load(self.config.as_deref())?;
        let files = resolve_patterns(&self.input)?;
        let texts = FileReader::read_all_texts(&files)?;
        let mut metrics = FileReader::read_metrics(&self.metrics)?;
        log::info!(
            "Recalculating {} stored metric(s) against {} text(s)",
            metrics.len(),
            texts.len()
        );

        let report = recalculate_position_accuracy(
            &mut metrics,
            &texts,
            config.settings.batch.max_reported_errors,
        );

        let output = self.output.as_ref().unwrap_or(&self.metrics);
        save_metrics(output, &metrics, config.settings.output.pretty_json)
            .with_context(|| format!("Failed to write metrics: {}", output.display()))?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spanagree_core::load_metrics;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_recalculate_in_place() {
        let dir = TempDir::new().unwrap();
        let texts = dir.path().join("texts.json");
        let metrics = dir.path().join("metrics.json");
        fs::write(
            &texts,
            r#"{"id": "a", "content": "Tai yra propagandos tekstas",
                "expert_annotations": {"annotations": [{"value": {"start": 8, "end": 27, "text": "propagandos tekstas", "labels": ["Doubt"]}}]},
                "model_annotations": {"gpt": {"annotations": [{"value": {"start": 8, "end": 27, "text": "propagandos tekstas", "labels": ["Doubt"]}}]}}}"#,
        )
        .unwrap();
        fs::write(
            &metrics,
            r#"[{"text_id": "a", "model": "gpt", "true_positives": 1, "false_positives": 0,
                "false_negatives": 0, "precision": 1.0, "recall": 1.0, "f1_score": 1.0,
                "position_accuracy": 0.1}]"#,
        )
        .unwrap();

        let args = RecalculateArgs {
            input: vec![texts.to_string_lossy().into_owned()],
            metrics: metrics.clone(),
            output: None,
            config: None,
            quiet: true,
            verbose: 0,
        };
        let report = args.run().unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.updated, 1);

        let stored = load_metrics(&metrics).unwrap();
        assert_eq!(stored[0].position_accuracy, 1.0);
        assert_eq!(stored[0].precision, 1.0);
    }

    #[test]
    fn test_error_list_follows_batch_limit() {
        let dir = TempDir::new().unwrap();
        let texts = dir.path().join("texts.json");
        let metrics = dir.path().join("metrics.json");
        let settings = dir.path().join("spanagree.toml");
        fs::write(&texts, r#"{"id": "a", "content": "Tekstas"}"#).unwrap();
        let stored = |id: &str| {
            format!(
                r#"{{"text_id": "{id}", "model": "gpt", "true_positives": 0, "false_positives": 0,
                    "false_negatives": 0, "precision": 1.0, "recall": 1.0, "f1_score": 1.0,
                    "position_accuracy": 1.0}}"#
            )
        };
        fs::write(
            &metrics,
            format!("[{}, {}, {}]", stored("x"), stored("y"), stored("z")),
        )
        .unwrap();
        fs::write(
            &settings,
            "[repair]\nmax_reported_errors = 10\n\n[batch]\nmax_reported_errors = 1\n",
        )
        .unwrap();

        let args = RecalculateArgs {
            input: vec![texts.to_string_lossy().into_owned()],
            metrics,
            output: None,
            config: Some(settings),
            quiet: true,
            verbose: 0,
        };
        let report = args.run().unwrap();
        assert_eq!(report.errored, 3);
        assert_eq!(report.errors, vec!["text x not found".to_string()]);
        assert_eq!(report.suppressed_errors(), 2);
    }

    #[test]
    fn test_missing_metrics_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let texts = dir.path().join("texts.json");
        fs::write(&texts, "[]").unwrap();

        let args = RecalculateArgs {
            input: vec![texts.to_string_lossy().into_owned()],
            metrics: dir.path().join("missing.json"),
            output: None,
            config: None,
            quiet: true,
            verbose: 0,
        };
        let err = args.run().unwrap_err();
        assert!(err.to_string().contains("Failed to load metrics"));
    }
}
