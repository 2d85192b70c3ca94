//! Span alignment and agreement scoring for labeled text annotations
//!
//! This crate compares two independently produced sets of labeled spans
//! over the same text, typically an expert's ground truth and a language
//! model's output, and derives agreement statistics from the comparison.
//!
//! # Pipeline
//!
//! - **extract**: raw annotation JSON in any of the supported layouts
//!   becomes a list of [`Span`]s; malformed or degenerate items are dropped
//! - **matcher**: greedy one-to-one overlap matching yields true positive,
//!   false positive and false negative counts
//! - **position**: character-level overlap quality between the two sets,
//!   computed independently of the matching
//! - **metrics**: precision, recall and F1 per comparison, and per-model
//!   mean and standard deviation across comparisons
//! - **repair**: offline recovery of stale span offsets
//!
//! All scoring functions are pure and keep no shared state, so they can be
//! called from any number of threads at once.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use spanagree_core::{extract, MetricsCalculator, ScoringConfig};
//!
//! let expert = extract(&json!([{ "result": [
//!     { "type": "labels", "value": { "start": 0, "end": 20, "text": "Tai yra propagandos", "labels": ["Doubt"] } }
//! ] }]));
//! let model = extract(&json!({ "annotations": [
//!     { "type": "labels", "value": { "start": 10, "end": 30, "text": "propagandos tekstas", "labels": ["Doubt"] } }
//! ] }));
//!
//! let calculator = MetricsCalculator::new(ScoringConfig::default());
//! let metric = calculator.compare("1", "claude", &expert, &model);
//!
//! assert_eq!(metric.true_positives, 1);
//! assert_eq!(metric.position_accuracy, 0.5);
//! ```

#![warn(missing_docs)]

pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod metrics;
pub mod position;
pub mod record;
pub mod repair;
pub mod span;

pub use batch::{
    evaluate_batch, evaluate_text, recalculate_position_accuracy, repair_texts, BatchReport,
};
pub use config::{
    BatchConfig, OutputSettings, RepairConfig, ScoringConfig, ScoringConfigBuilder, Settings,
};
pub use error::{Result, SpanAgreeError};
pub use extract::{extract, extract_str, extract_with_report, AnnotationShape, ExtractionReport};
pub use matcher::{match_spans, MatchResult, MatchedPair, OverlapMatcher};
pub use metrics::{
    summarize, AccuracyMetrics, ComparisonMetric, MetricsCalculator, ModelSummary, Statistic,
};
pub use position::{position_accuracy, round4};
pub use record::{
    load_metrics, load_text_file, load_texts, parse_metrics, parse_texts, save_metrics,
    save_text_file, save_texts, AnnotatedText, TextFile, TextId,
};
pub use repair::{needs_repair, repair, repair_annotations, Repair, RepairReport, RepairStrategy};
pub use span::Span;
