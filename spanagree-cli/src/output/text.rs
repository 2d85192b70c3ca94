//! Plain text output formatter

use super::OutputFormatter;
use anyhow::Result;
use spanagree_core::{ComparisonMetric, ModelSummary};
use std::collections::BTreeMap;
use std::io::Write;

/// Plain text formatter - outputs one comparison per line
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn format_metric(&mut self, m: &ComparisonMetric) -> Result<()> {
        writeln!(
            self.writer,
            "text={} model={} tp={} fp={} fn={} precision={:.4} recall={:.4} f1={:.4} position_accuracy={:.4}",
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
        for (model, s) in summary {
            writeln!(self.writer, "{model} ({} records)", s.records)?;
            for (name, stat) in [
                ("precision", &s.precision),
                ("recall", &s.recall),
                ("f1", &s.f1_score),
                ("position_accuracy", &s.position_accuracy),
            ] {
                writeln!(
                    self.writer,
                    "  {name}: {:.4} ± {:.4}",
                    stat.mean, stat.std_dev
                )?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::{metric, SharedBuffer};
    use spanagree_core::summarize;

    #[test]
    fn test_one_line_per_metric() {
        let buffer = SharedBuffer::default();
        let mut formatter = TextFormatter::new(buffer.clone());

        formatter.format_metric(&metric("1", "gpt", 0.5)).unwrap();
        formatter.format_metric(&metric("2", "gpt", 1.0)).unwrap();
        formatter.finish().unwrap();

        let output = buffer.contents();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("text=1 model=gpt tp=1 fp=1 fn=0 precision=0.5000"));
        assert!(lines[1].ends_with("position_accuracy=0.7333"));
    }

    #[test]
    fn test_summary_block() {
        let buffer = SharedBuffer::default();
        let mut formatter = TextFormatter::new(buffer.clone());
        let records = vec![metric("1", "gpt", 0.5), metric("2", "gpt", 1.0)];

        formatter.format_summary(&summarize(&records)).unwrap();

        let output = buffer.contents();
        assert!(output.contains("gpt (2 records)"));
        assert!(output.contains("  precision: 0.7500 ± 0.2500"));
    }
}
