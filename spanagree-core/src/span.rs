//! Labeled character spans

use serde::{Deserialize, Serialize};

/// A labeled interval over a text.
///
/// Offsets count Unicode scalar values, not bytes, so `start..end` indexes
/// `content.chars()`. The stored `text` is whatever the annotator claimed
/// the span covers and may have drifted from the slice the offsets point at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First character covered by the span
    pub start: usize,
    /// One past the last character covered by the span
    pub end: usize,
    /// Text the span claims to cover
    pub text: String,
    /// Technique identifiers, compared with exact string equality
    pub labels: Vec<String>,
}

impl Span {
    /// Create a span, rejecting degenerate input.
    ///
    /// Returns `None` when `start >= end`, when `labels` is empty, or when
    /// `text` is empty. Such spans are never scored.
    pub fn new(start: usize, end: usize, text: impl Into<String>, labels: Vec<String>) -> Option<Self> {
        let text = text.into();
        if start >= end || labels.is_empty() || text.is_empty() {
            return None;
        }

        Some(Self {
            start,
            end,
            text,
            labels,
        })
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for zero-width spans
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the intersection with `other`, zero when disjoint
    pub fn overlap_len(&self, other: &Span) -> usize {
        self.end
            .min(other.end)
            .saturating_sub(self.start.max(other.start))
    }

    /// Strict positive-length intersection test
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// True when the two label sets have at least one identifier in common
    pub fn shares_label(&self, other: &Span) -> bool {
        self.labels.iter().any(|label| other.labels.contains(label))
    }

    /// The characters of `content` the offsets point at, clamped to its length.
    pub fn slice_of(&self, content: &str) -> String {
        content.chars().skip(self.start).take(self.len()).collect()
    }

    /// Copy of this span moved to new offsets.
    pub fn with_offsets(&self, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }
}

/// Sum of span lengths
pub fn total_length(spans: &[Span]) -> usize {
    spans.iter().map(Span::len).sum()
}
