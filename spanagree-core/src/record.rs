//! Annotated texts and stored metrics as exchanged with the persistence layer
//!
//! Text files are rewritten by the repair pass, so a text keeps every
//! field it was read with, its identifier keeps its JSON type and a file
//! holding a single record is written back as a single record.

use crate::error::{Result, SpanAgreeError};
use crate::extract::extract;
use crate::metrics::ComparisonMetric;
use crate::span::Span;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Text identifier, numeric or textual as stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextId::Number(n) => write!(f, "{n}"),
            TextId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for TextId {
    fn from(id: u64) -> Self {
        TextId::Number(id)
    }
}

impl From<&str> for TextId {
    fn from(id: &str) -> Self {
        TextId::Text(id.to_owned())
    }
}

impl From<String> for TextId {
    fn from(id: String) -> Self {
        TextId::Text(id)
    }
}

impl From<&TextId> for String {
    fn from(id: &TextId) -> Self {
        id.to_string()
    }
}

/// Identifiers compare by their textual form, so `17` equals `"17"`
impl PartialEq<str> for TextId {
    fn eq(&self, other: &str) -> bool {
        match self {
            TextId::Number(n) => n.to_string() == other,
            TextId::Text(s) => s == other,
        }
    }
}

impl PartialEq<&str> for TextId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// One text with its expert annotations and the annotations of each model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedText {
    /// Text identifier
    pub id: TextId,
    /// Full text content the span offsets index into
    pub content: String,
    /// Raw expert annotation blob, `null` when the text has no ground truth
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub expert_annotations: Value,
    /// Raw annotation blob per model identifier
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub model_annotations: BTreeMap<String, Value>,
    /// Fields the scorer does not use, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnnotatedText {
    /// Text with no annotations yet
    pub fn new(id: impl Into<TextId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            expert_annotations: Value::Null,
            model_annotations: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Spans from the expert annotations
    pub fn expert_spans(&self) -> Vec<Span> {
        extract(&self.expert_annotations)
    }

    /// Spans from one model's annotations, `None` for unknown models
    pub fn model_spans(&self, model: &str) -> Option<Vec<Span>> {
        self.model_annotations.get(model).map(extract)
    }

    /// Model identifiers in sorted order
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.model_annotations.keys().map(String::as_str)
    }
}

/// Contents of a text file: one record or an array of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextFile {
    Many(Vec<AnnotatedText>),
    One(AnnotatedText),
}

impl TextFile {
    pub fn texts(&self) -> &[AnnotatedText] {
        match self {
            TextFile::Many(texts) => texts.as_slice(),
            TextFile::One(text) => std::slice::from_ref(text),
        }
    }

    pub fn texts_mut(&mut self) -> &mut [AnnotatedText] {
        match self {
            TextFile::Many(texts) => texts.as_mut_slice(),
            TextFile::One(text) => std::slice::from_mut(text),
        }
    }

    pub fn into_texts(self) -> Vec<AnnotatedText> {
        match self {
            TextFile::Many(texts) => texts,
            TextFile::One(text) => vec![text],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetricsFile {
    Bare(Vec<ComparisonMetric>),
    Wrapped { metrics: Vec<ComparisonMetric> },
}

/// Parse texts from JSON holding one record or an array of records
pub fn parse_texts(source: &str) -> serde_json::Result<Vec<AnnotatedText>> {
    serde_json::from_str::<TextFile>(source).map(TextFile::into_texts)
}

/// Load a text file, remembering whether it held one record or many
pub fn load_text_file(path: impl AsRef<Path>) -> Result<TextFile> {
    let path = path.as_ref();
    let source = read(path)?;
    serde_json::from_str(&source).map_err(|source| SpanAgreeError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load texts from a JSON file
pub fn load_texts(path: impl AsRef<Path>) -> Result<Vec<AnnotatedText>> {
    load_text_file(path).map(TextFile::into_texts)
}

/// Write a text file back in the layout it was read with
pub fn save_text_file(path: impl AsRef<Path>, file: &TextFile, pretty: bool) -> Result<()> {
    write_json(path.as_ref(), file, pretty)
}

/// Write texts as a JSON array
pub fn save_texts(path: impl AsRef<Path>, texts: &[AnnotatedText], pretty: bool) -> Result<()> {
    write_json(path.as_ref(), texts, pretty)
}

/// Parse metrics from a bare array or an object with a `metrics` array
pub fn parse_metrics(source: &str) -> serde_json::Result<Vec<ComparisonMetric>> {
    Ok(match serde_json::from_str(source)? {
        MetricsFile::Bare(metrics) => metrics,
        MetricsFile::Wrapped { metrics } => metrics,
    })
}

/// Load stored metrics from a JSON file
pub fn load_metrics(path: impl AsRef<Path>) -> Result<Vec<ComparisonMetric>> {
    let path = path.as_ref();
    let source = read(path)?;
    parse_metrics(&source).map_err(|source| SpanAgreeError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write metrics as a JSON array
pub fn save_metrics(
    path: impl AsRef<Path>,
    metrics: &[ComparisonMetric],
    pretty: bool,
) -> Result<()> {
    write_json(path.as_ref(), metrics, pretty)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| SpanAgreeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|source| SpanAgreeError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, encoded + "\n").map_err(|source| SpanAgreeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
