//! Batch drivers shared by live scoring and the maintenance tools
//!
//! Every caller goes through these functions so that scores computed
//! during analysis and scores recomputed later come from the same code.

use crate::config::{RepairConfig, ScoringConfig};
use crate::extract::extract;
use crate::metrics::{ComparisonMetric, MetricsCalculator};
use crate::position::position_accuracy;
use crate::record::AnnotatedText;
use crate::repair::{repair_annotations, RepairReport};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Counts reported by batch maintenance passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records examined
    pub processed: usize,
    /// Records whose stored values changed
    pub updated: usize,
    /// Records that could not be handled
    pub errored: usize,
    /// Error messages, bounded by the configured maximum
    pub errors: Vec<String>,
}

impl BatchReport {
    /// Record an error, keeping at most `max_errors` messages
    pub fn record_error(&mut self, message: String, max_errors: usize) {
        self.errored += 1;
        if self.errors.len() < max_errors {
            self.errors.push(message);
        }
    }

    /// Number of error messages dropped by the bound
    pub fn suppressed_errors(&self) -> usize {
        self.errored.saturating_sub(self.errors.len())
    }
}

/// Score every model of one text against its expert annotations.
///
/// Returns one record per model, in model identifier order.
pub fn evaluate_text(
    text: &AnnotatedText,
    job_id: Option<&str>,
    calculator: &MetricsCalculator,
) -> Vec<ComparisonMetric> {
    let reference = text.expert_spans();
    if reference.is_empty() {
        debug!(text_id = %text.id, "text has no expert spans");
    }

    text.model_annotations
        .iter()
        .map(|(model, raw)| {
            let candidate = extract(raw);
            let mut metric = calculator.compare(&text.id, model, &reference, &candidate);
            metric.job_id = job_id.map(str::to_owned);
            debug!(
                text_id = %text.id,
                model = %model,
                tp = metric.true_positives,
                fp = metric.false_positives,
                fn_ = metric.false_negatives,
                position_accuracy = metric.position_accuracy,
                "scored text"
            );
            metric
        })
        .collect()
}

/// Score every (text, model) pair of a batch.
///
/// Output order follows the input texts, then model identifiers. Texts
/// are scored in parallel when the `parallel` feature is enabled.
pub fn evaluate_batch(
    texts: &[AnnotatedText],
    job_id: Option<&str>,
    config: &ScoringConfig,
) -> Vec<ComparisonMetric> {
    let calculator = MetricsCalculator::new(*config);

    #[cfg(feature = "parallel")]
    let per_text: Vec<Vec<ComparisonMetric>> = texts
        .par_iter()
        .map(|text| evaluate_text(text, job_id, &calculator))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_text: Vec<Vec<ComparisonMetric>> = texts
        .iter()
        .map(|text| evaluate_text(text, job_id, &calculator))
        .collect();

    let metrics: Vec<ComparisonMetric> = per_text.into_iter().flatten().collect();
    info!(
        texts = texts.len(),
        comparisons = metrics.len(),
        "evaluated batch"
    );
    metrics
}

/// Recompute `position_accuracy` of stored metrics from their texts.
///
/// Only `position_accuracy` is overwritten. Records whose text or model
/// annotations are missing, or whose text id occurs more than once among
/// `texts`, are reported and left untouched.
pub fn recalculate_position_accuracy(
    metrics: &mut [ComparisonMetric],
    texts: &[AnnotatedText],
    max_errors: usize,
) -> BatchReport {
    // `None` marks an id shared by several texts
    let mut by_id: HashMap<String, Option<&AnnotatedText>> = HashMap::new();
    for text in texts {
        by_id
            .entry(text.id.to_string())
            .and_modify(|slot| {
                if slot.take().is_some() {
                    warn!(text_id = %text.id, "text id occurs more than once");
                }
            })
            .or_insert(Some(text));
    }
    let mut report = BatchReport::default();

    for metric in metrics.iter_mut() {
        report.processed += 1;

        let text = match by_id.get(metric.text_id.as_str()) {
            Some(Some(text)) => text,
            Some(None) => {
                report.record_error(
                    format!("text {} is not unique", metric.text_id),
                    max_errors,
                );
                continue;
            }
            None => {
                warn!(text_id = %metric.text_id, "no text for stored metric");
                report.record_error(format!("text {} not found", metric.text_id), max_errors);
                continue;
            }
        };

        let Some(candidate) = text.model_spans(&metric.model) else {
            warn!(text_id = %metric.text_id, model = %metric.model, "no model annotations for stored metric");
            report.record_error(
                format!(
                    "text {} has no annotations for model {}",
                    metric.text_id, metric.model
                ),
                max_errors,
            );
            continue;
        };

        let recalculated = position_accuracy(&text.expert_spans(), &candidate);
        if recalculated != metric.position_accuracy {
            info!(
                text_id = %metric.text_id,
                model = %metric.model,
                before = metric.position_accuracy,
                after = recalculated,
                "updated position accuracy"
            );
            metric.position_accuracy = recalculated;
            report.updated += 1;
        }
    }

    report
}

/// Repair stale span offsets in the expert and model annotations of
/// every text, in place.
pub fn repair_texts(texts: &mut [AnnotatedText], config: &RepairConfig) -> RepairReport {
    let mut total = RepairReport::default();
    let max_errors = config.max_reported_errors;

    for text in texts.iter_mut() {
        let report = repair_annotations(&mut text.expert_annotations, &text.content, config);
        total.absorb(report, &format!("text {} / expert", text.id), max_errors);

        for (model, raw) in text.model_annotations.iter_mut() {
            let report = repair_annotations(raw, &text.content, config);
            total.absorb(report, &format!("text {} / {}", text.id, model), max_errors);
        }
    }

    info!(
        checked = total.checked,
        fixed = total.fixed,
        failed = total.failed,
        "repair pass finished"
    );
    total
}
