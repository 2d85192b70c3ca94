//! Output formatting module

use anyhow::Result;
use spanagree_core::{ComparisonMetric, ModelSummary};
use std::collections::BTreeMap;
use std::io::Write;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format and output one comparison record
    fn format_metric(&mut self, metric: &ComparisonMetric) -> Result<()>;

    /// Format and output the per-model summary
    fn format_summary(&mut self, summary: &BTreeMap<String, ModelSummary>) -> Result<()>;

    /// Finalize output (e.g., write the collected JSON document)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per comparison
    Text,
    /// JSON document with `metrics` and optional `summary`
    Json,
    /// Markdown tables
    Markdown,
}

/// Build the formatter for `format` writing to `writer`
pub fn create_formatter<W>(
    format: OutputFormat,
    writer: W,
    pretty_json: bool,
) -> Box<dyn OutputFormatter>
where
    W: Write + Send + Sync + 'static,
{
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(writer)),
        OutputFormat::Json => Box::new(JsonFormatter::new(writer, pretty_json)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer)),
    }
}
