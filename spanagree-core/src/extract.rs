//! Normalization of raw annotation blobs into spans
//!
//! Annotation JSON arrives in one of three layouts. The layout is resolved
//! once into an [`AnnotationShape`] and the items are then read the same way
//! regardless of whether the blob holds expert or model annotations.
//!
//! Nothing in here fails. A blob that matches no layout, or items with
//! missing or non-integer offsets, simply produce fewer spans.

use crate::span::Span;
use serde_json::Value;
use tracing::debug;

/// Recognised layouts of a raw annotation blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationShape {
    /// `[{"result": [item, ...]}, ...]`, items taken from the first element
    ResultWrapper,
    /// `{"annotations": [item, ...]}`
    DirectAnnotations,
    /// `[item, ...]` where items carry a `value` key directly
    FlatList,
}

impl AnnotationShape {
    /// Detect the layout of `raw`, trying each layout in priority order.
    pub fn detect(raw: &Value) -> Option<Self> {
        if raw
            .get(0)
            .and_then(|first| first.get("result"))
            .is_some_and(Value::is_array)
        {
            return Some(Self::ResultWrapper);
        }

        if raw.get("annotations").is_some_and(Value::is_array) {
            return Some(Self::DirectAnnotations);
        }

        if raw.get(0).is_some_and(|first| first.get("value").is_some()) {
            return Some(Self::FlatList);
        }

        None
    }

    /// Annotation items of `raw` under this layout
    pub fn items(self, raw: &Value) -> &[Value] {
        let items = match self {
            Self::ResultWrapper => raw.get(0).and_then(|first| first.get("result")),
            Self::DirectAnnotations => raw.get("annotations"),
            Self::FlatList => Some(raw),
        };

        items
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Mutable annotation items of `raw` under this layout
    pub fn items_mut(self, raw: &mut Value) -> Option<&mut Vec<Value>> {
        let items = match self {
            Self::ResultWrapper => raw.get_mut(0)?.get_mut("result")?,
            Self::DirectAnnotations => raw.get_mut("annotations")?,
            Self::FlatList => raw,
        };
        items.as_array_mut()
    }

    /// Short name used in logs and reports
    pub fn name(self) -> &'static str {
        match self {
            Self::ResultWrapper => "result_wrapper",
            Self::DirectAnnotations => "direct_annotations",
            Self::FlatList => "flat_list",
        }
    }
}

/// What an extraction pass kept and discarded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Layout the blob was read as, `None` when unrecognised
    pub shape: Option<AnnotationShape>,
    /// Items that became spans
    pub kept: usize,
    /// Items dropped as malformed or degenerate
    pub dropped: usize,
}

/// Extract the scorable spans from a raw annotation blob.
pub fn extract(raw: &Value) -> Vec<Span> {
    extract_with_report(raw).0
}

/// Extract spans from the JSON text of an annotation blob.
pub fn extract_str(raw: &str) -> Vec<Span> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => extract(&value),
        Err(e) => {
            debug!(error = %e, "annotation blob is not valid JSON");
            Vec::new()
        }
    }
}

/// Extract spans and report how many items were discarded.
///
/// A blob stored as a JSON string holding the annotation document is
/// decoded once before the layout is detected.
pub fn extract_with_report(raw: &Value) -> (Vec<Span>, ExtractionReport) {
    match decode_embedded(raw) {
        Some(decoded) => extract_value(&decoded),
        None => extract_value(raw),
    }
}

/// Decode a blob that was stored as a JSON string. `None` when `raw` is
/// not a string.
pub(crate) fn decode_embedded(raw: &Value) -> Option<Value> {
    let encoded = raw.as_str()?;
    match serde_json::from_str::<Value>(encoded) {
        // A string holding another string is not an annotation document
        Ok(decoded) if !decoded.is_string() => Some(decoded),
        _ => Some(Value::Null),
    }
}

fn extract_value(raw: &Value) -> (Vec<Span>, ExtractionReport) {
    let Some(shape) = AnnotationShape::detect(raw) else {
        if !raw.is_null() {
            debug!("annotation blob matches no known layout");
        }
        return (Vec::new(), ExtractionReport::default());
    };

    let items = shape.items(raw);
    let spans: Vec<Span> = items.iter().filter_map(span_from_item).collect();
    let report = ExtractionReport {
        shape: Some(shape),
        kept: spans.len(),
        dropped: items.len() - spans.len(),
    };

    if report.dropped > 0 {
        debug!(
            shape = shape.name(),
            kept = report.kept,
            dropped = report.dropped,
            "dropped malformed or degenerate annotations"
        );
    }

    (spans, report)
}

/// Read one annotation item. Items of another `type` than `labels`,
/// items without usable offsets, and degenerate spans yield `None`.
pub(crate) fn span_from_item(item: &Value) -> Option<Span> {
    let item = item.as_object()?;

    if let Some(kind) = item.get("type").and_then(Value::as_str) {
        if kind != "labels" {
            return None;
        }
    }

    let value = item.get("value")?.as_object()?;
    let start = coerce_offset(value.get("start")?)?;
    let end = coerce_offset(value.get("end")?)?;
    let text = value.get("text").and_then(Value::as_str).unwrap_or_default();
    let labels = value
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(Value::as_str)
                .filter(|label| !label.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Span::new(start, end, text, labels)
}

/// Offsets may be stored as integers, integral floats, or numeric strings.
fn coerce_offset(value: &Value) -> Option<usize> {
    let offset = match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;

    usize::try_from(offset).ok()
}
