//! Markdown output formatter

use super::OutputFormatter;
use anyhow::Result;
use spanagree_core::{ComparisonMetric, ModelSummary};
use std::collections::BTreeMap;
use std::io::Write;

/// Markdown formatter - outputs comparisons as a table
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    metric_count: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            metric_count: 0,
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for MarkdownFormatter<W> {
    fn format_metric(&mut self, m: &ComparisonMetric) -> Result<()> {
        if self.metric_count == 0 {
            writeln!(
                self.writer,
                "| Text | Model | TP | FP | FN | Precision | Recall | F1 | Position |"
            )?;
            writeln!(self.writer, "|---|---|---:|---:|---:|---:|---:|---:|---:|")?;
        }
        self.metric_count += 1;
        writeln!(
            self.writer,
            "| {} | {} | {} | {} | {} | {:.4} | {:.4} | {:.4} | {:.4} |",
            m.text_id,
            m.model,
            m.true_positives,
            m.false_positives,
            m.false_negatives,
            m.precision,
            m.recall,
            m.f1_score,
            m.position_accuracy
        )?;
        Ok(())
    }

    fn format_summary(&mut self, summary: &BTreeMap<String, ModelSummary>) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "## Summary")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "| Model | Records | Precision | Recall | F1 | Position |"
        )?;
        writeln!(self.writer, "|---|---:|---:|---:|---:|---:|")?;
        for (model, s) in summary {
            writeln!(
                self.writer,
                "| {model} | {} | {:.4} ± {:.4} | {:.4} ± {:.4} | {:.4} ± {:.4} | {:.4} ± {:.4} |",
                s.records,
                s.precision.mean,
                s.precision.std_dev,
                s.recall.mean,
                s.recall.std_dev,
                s.f1_score.mean,
                s.f1_score.std_dev,
                s.position_accuracy.mean,
                s.position_accuracy.std_dev
            )?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total comparisons: {}*", self.metric_count)?;
        self.writer.flush()?;
        Ok(())
    }
}
