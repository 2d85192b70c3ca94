//! Recovery of stale span offsets
//!
//! Stored offsets sometimes stop pointing at the stored span text after
//! upstream encoding or whitespace changes. Repair looks the text up again,
//! trying an exact search, then a case-insensitive one, then a search with
//! every whitespace run collapsed to one space. Only a textual hit is
//! accepted; when all three miss the span is left as it was.

use crate::config::RepairConfig;
use crate::extract::{decode_embedded, span_from_item, AnnotationShape};
use crate::span::Span;
use serde_json::Value;
use std::fmt;
use tracing::{error, info};

/// Search that located the span text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    /// Case-sensitive substring search
    Exact,
    /// Substring search ignoring case
    CaseInsensitive,
    /// Substring search with whitespace runs collapsed
    WhitespaceNormalized,
}

impl fmt::Display for RepairStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairStrategy::Exact => write!(f, "exact"),
            RepairStrategy::CaseInsensitive => write!(f, "case-insensitive"),
            RepairStrategy::WhitespaceNormalized => write!(f, "whitespace-normalized"),
        }
    }
}

/// A corrected span and how it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    /// Copy of the input span with corrected offsets
    pub span: Span,
    /// Search that produced the offsets
    pub strategy: RepairStrategy,
}

/// True when the trimmed text at the stored offsets differs from the
/// trimmed stored text.
pub fn needs_repair(span: &Span, content: &str) -> bool {
    span.slice_of(content).trim() != span.text.trim()
}

/// Find corrected offsets for `span` in `content`.
///
/// The first occurrence found by the first successful strategy wins.
/// Returns `None` when the text cannot be located.
pub fn repair(span: &Span, content: &str) -> Option<Repair> {
    let needle = span.text.trim();
    if needle.is_empty() {
        return None;
    }

    let haystack: Vec<char> = content.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();

    let (start, end, strategy) = find_exact(content, needle)
        .map(|(start, end)| (start, end, RepairStrategy::Exact))
        .or_else(|| {
            find_chars(&haystack, &needle_chars, chars_eq_ignore_case)
                .map(|start| (start, start + needle_chars.len(), RepairStrategy::CaseInsensitive))
        })
        .or_else(|| {
            find_whitespace_normalized(&haystack, &needle_chars)
                .map(|(start, end)| (start, end, RepairStrategy::WhitespaceNormalized))
        })?;

    Some(Repair {
        span: span.with_offsets(start, end),
        strategy,
    })
}

/// Outcome of repairing the spans of one or more annotation blobs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Spans examined
    pub checked: usize,
    /// Spans whose offsets were rewritten
    pub fixed: usize,
    /// Spans already pointing at their text
    pub unchanged: usize,
    /// Spans whose text could not be located
    pub failed: usize,
    /// Failure messages, bounded by the configured maximum
    pub errors: Vec<String>,
}

impl RepairReport {
    /// Record a failure, keeping at most `max_errors` messages
    pub fn record_failure(&mut self, message: String, max_errors: usize) {
        self.failed += 1;
        if self.errors.len() < max_errors {
            self.errors.push(message);
        }
    }

    /// Fold another report into this one, prefixing its messages
    pub fn absorb(&mut self, other: RepairReport, context: &str, max_errors: usize) {
        self.checked += other.checked;
        self.fixed += other.fixed;
        self.unchanged += other.unchanged;
        self.failed += other.failed;

        let room = max_errors.saturating_sub(self.errors.len());
        self.errors.extend(
            other
                .errors
                .into_iter()
                .take(room)
                .map(|message| format!("{context}: {message}")),
        );
    }

    /// Number of error messages dropped by the bound
    pub fn suppressed_errors(&self) -> usize {
        self.failed.saturating_sub(self.errors.len())
    }
}

/// Repair every stale span of a raw annotation blob in place.
///
/// Works on all recognised layouts, including blobs stored as a JSON
/// string. Items that are not scorable spans are left alone and not
/// counted. A failure on one item never stops the others.
pub fn repair_annotations(raw: &mut Value, content: &str, config: &RepairConfig) -> RepairReport {
    if let Some(mut decoded) = decode_embedded(raw) {
        let report = repair_annotations(&mut decoded, content, config);
        if report.fixed > 0 {
            *raw = Value::String(decoded.to_string());
        }
        return report;
    }

    let mut report = RepairReport::default();
    let Some(shape) = AnnotationShape::detect(raw) else {
        return report;
    };
    let Some(items) = shape.items_mut(raw) else {
        return report;
    };

    for item in items.iter_mut() {
        repair_item(item, content, config, &mut report);
    }

    report
}

fn repair_item(item: &mut Value, content: &str, config: &RepairConfig, report: &mut RepairReport) {
    let Some(span) = span_from_item(item) else {
        return;
    };
    report.checked += 1;

    if !needs_repair(&span, content) {
        report.unchanged += 1;
        return;
    }

    match repair(&span, content) {
        Some(found) if (found.span.start, found.span.end) == (span.start, span.end) => {
            // Offsets already point at the first occurrence
            report.unchanged += 1;
        }
        Some(found) => {
            if let Some(value) = item.get_mut("value").and_then(Value::as_object_mut) {
                value.insert("start".to_string(), Value::from(found.span.start));
                value.insert("end".to_string(), Value::from(found.span.end));
            }
            info!(
                text = %span.text,
                before = ?(span.start, span.end),
                after = ?(found.span.start, found.span.end),
                strategy = %found.strategy,
                "repaired span offsets"
            );
            report.fixed += 1;
        }
        None => {
            error!(
                text = %span.text,
                start = span.start,
                end = span.end,
                "span text not found in content"
            );
            report.record_failure(
                format!(
                    "text {:?} not found (stored at {}..{})",
                    span.text, span.start, span.end
                ),
                config.max_reported_errors,
            );
        }
    }
}

/// Exact search, converted from byte to character offsets
fn find_exact(content: &str, needle: &str) -> Option<(usize, usize)> {
    let byte_start = content.find(needle)?;
    let start = content[..byte_start].chars().count();
    Some((start, start + needle.chars().count()))
}

fn find_chars(haystack: &[char], needle: &[char], eq: impl Fn(char, char) -> bool) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.iter().zip(needle).all(|(&a, &b)| eq(a, b)))
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Text with whitespace runs collapsed, remembering where each kept
/// character came from.
struct Collapsed {
    chars: Vec<char>,
    origin: Vec<usize>,
}

fn collapse_whitespace(chars: &[char]) -> Collapsed {
    let mut collapsed = Collapsed {
        chars: Vec::with_capacity(chars.len()),
        origin: Vec::with_capacity(chars.len()),
    };
    let mut in_whitespace = false;

    for (index, &ch) in chars.iter().enumerate() {
        if ch.is_whitespace() {
            if !in_whitespace {
                collapsed.chars.push(' ');
                collapsed.origin.push(index);
            }
            in_whitespace = true;
        } else {
            collapsed.chars.push(ch);
            collapsed.origin.push(index);
            in_whitespace = false;
        }
    }

    collapsed
}

fn find_whitespace_normalized(haystack: &[char], needle: &[char]) -> Option<(usize, usize)> {
    let content = collapse_whitespace(haystack);
    let needle = collapse_whitespace(needle).chars;

    let position = find_chars(&content.chars, &needle, |a, b| a == b)?;
    let start = content.origin[position];
    // The needle is trimmed, so its last character is never a collapsed run
    let end = content.origin[position + needle.len() - 1] + 1;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn span(start: usize, end: usize, text: &str) -> Span {
        Span::new(start, end, text, vec!["Loaded_Language".to_string()]).unwrap()
    }

    #[test]
    fn test_needs_repair() {
        let content = "Tai yra propagandos tekstas";
        assert!(!needs_repair(&span(8, 19, "propagandos"), content));
        assert!(!needs_repair(&span(7, 20, " propagandos "), content));
        assert!(needs_repair(&span(5, 20, "propagandos"), content));
    }

    #[test]
    fn test_exact_repair_counts_characters() {
        let content = "Ši žinia — tikra propaganda.";
        let stale = span(0, 5, "tikra propaganda");

        let repaired = repair(&stale, content).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::Exact);
        assert_eq!((repaired.span.start, repaired.span.end), (11, 27));
        assert_eq!(repaired.span.slice_of(content), "tikra propaganda");
        assert_eq!(repaired.span.labels, stale.labels);
    }

    #[test]
    fn test_case_insensitive_repair() {
        let content = "VALDŽIA MELUOJA kasdien";
        let stale = span(3, 9, "Valdžia meluoja");

        let repaired = repair(&stale, content).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::CaseInsensitive);
        assert_eq!((repaired.span.start, repaired.span.end), (0, 15));
    }

    #[test]
    fn test_whitespace_normalized_repair() {
        let content = "Tai yra propagandos tekstas";
        let stale = span(5, 20, "propagandos  tekstas");

        let repaired = repair(&stale, content).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::WhitespaceNormalized);
        assert_eq!((repaired.span.start, repaired.span.end), (8, 27));
        assert_eq!(repaired.span.slice_of(content), "propagandos tekstas");
    }

    #[test]
    fn test_whitespace_runs_in_content_map_back() {
        let content = "Pradžia.\n\n  Jie   mus\tapgaudinėja!";
        let stale = span(0, 3, "Jie mus apgaudinėja");

        let repaired = repair(&stale, content).unwrap();
        assert_eq!(repaired.strategy, RepairStrategy::WhitespaceNormalized);
        assert_eq!(
            repaired.span.slice_of(content),
            "Jie   mus\tapgaudinėja"
        );
    }

    #[test]
    fn test_unlocatable_text() {
        let content = "Visai kitas tekstas";
        assert!(repair(&span(0, 5, "nėra čia"), content).is_none());
        assert!(repair(&span(0, 5, "   "), content).is_none());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let content = "melas ir vėl melas";
        let repaired = repair(&span(3, 6, "melas"), content).unwrap();
        assert_eq!(repaired.span.start, 0);
    }

    #[test]
    fn test_repair_annotations_rewrites_offsets() {
        let content = "Tai yra propagandos tekstas";
        let mut raw = json!([{ "result": [
            { "type": "labels", "value": { "start": 5, "end": 20, "text": "propagandos  tekstas", "labels": ["Doubt"] } },
            { "type": "labels", "value": { "start": 0, "end": 3, "text": "Tai", "labels": ["Doubt"] } },
            { "type": "labels", "value": { "start": 0, "end": 3, "text": "nerasta", "labels": ["Doubt"] } },
            { "type": "choices", "value": { "choices": ["x"] } }
        ] }]);

        let report = repair_annotations(&mut raw, content, &RepairConfig::default());
        assert_eq!(report.checked, 3);
        assert_eq!(report.fixed, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("nerasta"));

        assert_eq!(raw[0]["result"][0]["value"]["start"], json!(8));
        assert_eq!(raw[0]["result"][0]["value"]["end"], json!(27));
        // Failed spans keep their stored offsets
        assert_eq!(raw[0]["result"][2]["value"]["start"], json!(0));
        assert_eq!(raw[0]["result"][2]["value"]["end"], json!(3));
    }

    #[test]
    fn test_repair_annotations_second_pass_is_noop() {
        let content = "Tai yra propagandos tekstas";
        let mut raw = json!({ "annotations": [
            { "value": { "start": 5, "end": 20, "text": "propagandos  tekstas", "labels": ["Doubt"] } }
        ] });

        let first = repair_annotations(&mut raw, content, &RepairConfig::default());
        assert_eq!(first.fixed, 1);
        let after_first = raw.clone();

        let second = repair_annotations(&mut raw, content, &RepairConfig::default());
        assert_eq!(second.fixed, 0);
        assert_eq!(second.unchanged, 1);
        assert_eq!(raw, after_first);
    }

    #[test]
    fn test_repair_annotations_string_encoded_blob() {
        let content = "Tai yra propagandos tekstas";
        let inner = json!([{ "value": { "start": 0, "end": 4, "text": "tekstas", "labels": ["Doubt"] } }]);
        let mut raw = Value::String(inner.to_string());

        let report = repair_annotations(&mut raw, content, &RepairConfig::default());
        assert_eq!(report.fixed, 1);

        let decoded: Value = serde_json::from_str(raw.as_str().unwrap()).unwrap();
        assert_eq!(decoded[0]["value"]["start"], json!(20));
        assert_eq!(decoded[0]["value"]["end"], json!(27));
    }

    #[test]
    fn test_string_encoded_blob_keeps_key_order() {
        let content = "Tai yra propagandos tekstas";
        let stored = r#"{"annotations":[{"value":{"text":"propagandos tekstas","start":0,"end":5,"labels":["Doubt"]},"type":"labels","id":"z1"}]}"#;
        let mut raw = Value::String(stored.to_string());

        let report = repair_annotations(&mut raw, content, &RepairConfig::default());
        assert_eq!(report.fixed, 1);
        assert_eq!(
            raw.as_str().unwrap(),
            r#"{"annotations":[{"value":{"text":"propagandos tekstas","start":8,"end":27,"labels":["Doubt"]},"type":"labels","id":"z1"}]}"#
        );
    }

    #[test]
    fn test_error_list_is_bounded() {
        let content = "tuščia";
        let items: Vec<Value> = (0..10)
            .map(|i| json!({ "value": { "start": 0, "end": 2, "text": format!("missing {i}"), "labels": ["x"] } }))
            .collect();
        let mut raw = Value::Array(items);

        let config = RepairConfig {
            max_reported_errors: 3,
        };
        let report = repair_annotations(&mut raw, content, &config);
        assert_eq!(report.failed, 10);
        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.suppressed_errors(), 7);
    }

    #[test]
    fn test_absorb_prefixes_and_bounds() {
        let mut total = RepairReport::default();
        let mut part = RepairReport::default();
        part.checked = 2;
        part.record_failure("a".into(), 10);
        part.record_failure("b".into(), 10);

        total.absorb(part, "text 7 / expert", 1);
        assert_eq!(total.checked, 2);
        assert_eq!(total.failed, 2);
        assert_eq!(total.errors, vec!["text 7 / expert: a".to_string()]);
    }
}
