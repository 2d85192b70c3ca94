//! Greedy one-to-one span matching
//!
//! Every overlapping (reference, candidate) pair is scored by the length of
//! its intersection. Pairs are consumed longest overlap first, ties broken
//! by reference index and then candidate index, and a pair is accepted only
//! when neither side has been consumed yet. A single candidate span can
//! therefore never satisfy two reference spans.

use crate::config::ScoringConfig;
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// An accepted (reference, candidate) pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
    /// Index into the reference list
    pub reference_index: usize,
    /// Index into the candidate list
    pub candidate_index: usize,
    /// Characters shared by the two spans
    pub overlap: usize,
    /// Whether the spans have a label in common
    pub labels_agree: bool,
}

/// Outcome of matching a candidate list against a reference list.
///
/// `true_positives + false_negatives` equals the reference count and
/// `true_positives + false_positives` equals the candidate count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Matched pairs
    pub true_positives: usize,
    /// Unmatched candidate spans
    pub false_positives: usize,
    /// Unmatched reference spans
    pub false_negatives: usize,
    /// Accepted pairs in the order they were consumed
    pub pairs: Vec<MatchedPair>,
}

impl MatchResult {
    /// Number of reference spans that were compared
    pub fn reference_count(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    /// Number of candidate spans that were compared
    pub fn candidate_count(&self) -> usize {
        self.true_positives + self.false_positives
    }

    /// True when both sides were empty
    pub fn is_empty_comparison(&self) -> bool {
        self.reference_count() == 0 && self.candidate_count() == 0
    }

    /// Matched pairs whose labels also agree
    pub fn label_agreements(&self) -> usize {
        self.pairs.iter().filter(|pair| pair.labels_agree).count()
    }
}

/// Span matcher configured with a fixed policy
#[derive(Debug, Clone, Default)]
pub struct OverlapMatcher {
    config: ScoringConfig,
}

impl OverlapMatcher {
    /// Create a matcher with the given policy
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Policy in use
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Match `candidate` spans against `reference` spans.
    pub fn match_spans(&self, reference: &[Span], candidate: &[Span]) -> MatchResult {
        let mut scored = self.scored_pairs(reference, candidate);
        scored.sort_by(|a, b| {
            b.overlap
                .cmp(&a.overlap)
                .then(a.reference_index.cmp(&b.reference_index))
                .then(a.candidate_index.cmp(&b.candidate_index))
        });

        let mut reference_used = vec![false; reference.len()];
        let mut candidate_used = vec![false; candidate.len()];
        let mut pairs = Vec::new();

        for pair in scored {
            if reference_used[pair.reference_index] || candidate_used[pair.candidate_index] {
                continue;
            }
            reference_used[pair.reference_index] = true;
            candidate_used[pair.candidate_index] = true;
            pairs.push(pair);
        }

        let true_positives = pairs.len();
        MatchResult {
            true_positives,
            false_positives: candidate.len() - true_positives,
            false_negatives: reference.len() - true_positives,
            pairs,
        }
    }

    /// Every pair the policy allows to match, unsorted
    fn scored_pairs(&self, reference: &[Span], candidate: &[Span]) -> Vec<MatchedPair> {
        let mut pairs = Vec::new();

        for (reference_index, r) in reference.iter().enumerate() {
            for (candidate_index, c) in candidate.iter().enumerate() {
                let overlap = r.overlap_len(c);
                if !self.accepts(r, c, overlap) {
                    continue;
                }
                pairs.push(MatchedPair {
                    reference_index,
                    candidate_index,
                    overlap,
                    labels_agree: r.shares_label(c),
                });
            }
        }

        pairs
    }

    fn accepts(&self, reference: &Span, candidate: &Span, overlap: usize) -> bool {
        if overlap == 0 {
            return false;
        }

        if self.config.require_label_match && !reference.shares_label(candidate) {
            return false;
        }

        let threshold = self.config.overlap_threshold;
        if threshold > 0.0 {
            let shorter = reference.len().min(candidate.len());
            return overlap as f64 / shorter as f64 >= threshold;
        }

        true
    }
}

/// Match with a one-off matcher built from `config`
pub fn match_spans(reference: &[Span], candidate: &[Span], config: &ScoringConfig) -> MatchResult {
    OverlapMatcher::new(*config).match_spans(reference, candidate)
}
