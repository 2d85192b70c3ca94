//! Agreement metrics for expert versus model annotations

use crate::config::ScoringConfig;
use crate::matcher::{MatchResult, OverlapMatcher};
use crate::position::position_accuracy;
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Precision, recall and F1 derived from match counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    /// True positive count
    pub true_positives: usize,
    /// False positive count
    pub false_positives: usize,
    /// False negative count
    pub false_negatives: usize,
    /// Precision: TP / (TP + FP)
    pub precision: f64,
    /// Recall: TP / (TP + FN)
    pub recall: f64,
    /// F1 score: 2 * (precision * recall) / (precision + recall)
    pub f1_score: f64,
}

impl AccuracyMetrics {
    /// Create metrics from raw counts. Zero denominators give `0.0`.
    pub fn from_counts(
        true_positives: usize,
        false_positives: usize,
        false_negatives: usize,
    ) -> Self {
        let precision = if true_positives + false_positives > 0 {
            true_positives as f64 / (true_positives + false_positives) as f64
        } else {
            0.0
        };

        let recall = if true_positives + false_negatives > 0 {
            true_positives as f64 / (true_positives + false_negatives) as f64
        } else {
            0.0
        };

        let f1_score = if precision + recall > 0.0 {
            2.0 * (precision * recall) / (precision + recall)
        } else {
            0.0
        };

        Self {
            true_positives,
            false_positives,
            false_negatives,
            precision,
            recall,
            f1_score,
        }
    }

    /// Create metrics for one comparison.
    ///
    /// When neither side has any span the annotators agree perfectly on
    /// there being nothing to annotate, so precision, recall and F1 are 1.
    pub fn from_match(result: &MatchResult) -> Self {
        if result.is_empty_comparison() {
            return Self {
                true_positives: 0,
                false_positives: 0,
                false_negatives: 0,
                precision: 1.0,
                recall: 1.0,
                f1_score: 1.0,
            };
        }

        Self::from_counts(
            result.true_positives,
            result.false_positives,
            result.false_negatives,
        )
    }
}

/// Stored result for one (job, text, model) comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetric {
    /// Analysis job the comparison belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Text identifier
    pub text_id: String,
    /// Model identifier
    pub model: String,
    /// Matched spans
    pub true_positives: usize,
    /// Unmatched model spans
    pub false_positives: usize,
    /// Unmatched expert spans
    pub false_negatives: usize,
    /// Precision
    pub precision: f64,
    /// Recall
    pub recall: f64,
    /// F1 score
    pub f1_score: f64,
    /// Character-level position agreement
    pub position_accuracy: f64,
    /// Spans extracted from the expert annotations
    #[serde(default)]
    pub expert_span_count: usize,
    /// Spans extracted from the model annotations
    #[serde(default)]
    pub model_span_count: usize,
}

/// Builds [`ComparisonMetric`] records with a fixed matching policy
#[derive(Debug, Clone, Default)]
pub struct MetricsCalculator {
    matcher: OverlapMatcher,
}

impl MetricsCalculator {
    /// Create a calculator for the given policy
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            matcher: OverlapMatcher::new(config),
        }
    }

    /// Policy in use
    pub fn config(&self) -> &ScoringConfig {
        self.matcher.config()
    }

    /// Match counts and derived ratios for two span lists
    pub fn aggregate(&self, reference: &[Span], candidate: &[Span]) -> AccuracyMetrics {
        AccuracyMetrics::from_match(&self.matcher.match_spans(reference, candidate))
    }

    /// Compare expert spans against one model's spans.
    pub fn compare(
        &self,
        text_id: impl Into<String>,
        model: impl Into<String>,
        reference: &[Span],
        candidate: &[Span],
    ) -> ComparisonMetric {
        let accuracy = self.aggregate(reference, candidate);

        ComparisonMetric {
            job_id: None,
            text_id: text_id.into(),
            model: model.into(),
            true_positives: accuracy.true_positives,
            false_positives: accuracy.false_positives,
            false_negatives: accuracy.false_negatives,
            precision: accuracy.precision,
            recall: accuracy.recall,
            f1_score: accuracy.f1_score,
            position_accuracy: position_accuracy(reference, candidate),
            expert_span_count: reference.len(),
            model_span_count: candidate.len(),
        }
    }
}

/// Mean and population standard deviation of one metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl Statistic {
    /// Summarize a list of values. Empty and single-value lists have a
    /// standard deviation of zero.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Per-model summary across many comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Number of comparisons summarized
    pub records: usize,
    /// Precision across records
    pub precision: Statistic,
    /// Recall across records
    pub recall: Statistic,
    /// F1 across records
    pub f1_score: Statistic,
    /// Position accuracy across records
    pub position_accuracy: Statistic,
    /// Micro-averaged metrics over the summed counts
    pub totals: AccuracyMetrics,
}

/// Summarize records grouped by model identifier.
pub fn summarize(records: &[ComparisonMetric]) -> BTreeMap<String, ModelSummary> {
    let mut groups: BTreeMap<&str, Vec<&ComparisonMetric>> = BTreeMap::new();
    for record in records {
        groups.entry(record.model.as_str()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(model, group)| (model.to_string(), summarize_group(&group)))
        .collect()
}

fn summarize_group(group: &[&ComparisonMetric]) -> ModelSummary {
    let column = |field: fn(&ComparisonMetric) -> f64| -> Statistic {
        let values: Vec<f64> = group.iter().map(|record| field(record)).collect();
        Statistic::from_values(&values)
    };

    let (tp, fp, fn_count) = group.iter().fold((0, 0, 0), |(tp, fp, fn_count), r| {
        (
            tp + r.true_positives,
            fp + r.false_positives,
            fn_count + r.false_negatives,
        )
    });

    ModelSummary {
        records: group.len(),
        precision: column(|r| r.precision),
        recall: column(|r| r.recall),
        f1_score: column(|r| r.f1_score),
        position_accuracy: column(|r| r.position_accuracy),
        totals: AccuracyMetrics::from_counts(tp, fp, fn_count),
    }
}
