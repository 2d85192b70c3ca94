//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use spanagree_core::{ComparisonMetric, ModelSummary};
use std::collections::BTreeMap;
use std::io::Write;

/// JSON formatter - collects records and writes one document on finish
pub struct JsonFormatter<W: Write> {
    writer: W,
    pretty: bool,
    metrics: Vec<ComparisonMetric>,
    summary: Option<BTreeMap<String, ModelSummary>>,
}

/// Document written by [`JsonFormatter`]
#[derive(Debug, Serialize)]
pub struct MetricsDocument<'a> {
    /// One record per (text, model) comparison
    pub metrics: &'a [ComparisonMetric],
    /// Per-model mean and standard deviation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'a BTreeMap<String, ModelSummary>>,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            pretty,
            metrics: Vec::new(),
            summary: None,
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn format_metric(&mut self, metric: &ComparisonMetric) -> Result<()> {
        self.metrics.push(metric.clone());
        Ok(())
    }

    fn format_summary(&mut self, summary: &BTreeMap<String, ModelSummary>) -> Result<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let document = MetricsDocument {
            metrics: &self.metrics,
            summary: self.summary.as_ref(),
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &document)?;
        } else {
            serde_json::to_writer(&mut self.writer, &document)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
