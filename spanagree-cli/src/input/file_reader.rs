//! File reading utilities

use anyhow::{Context, Result};
use spanagree_core::{load_metrics, load_text_file, AnnotatedText, ComparisonMetric, TextFile};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads settings, texts and stored metrics from disk
pub struct FileReader;

impl FileReader {
    /// Read a file as UTF-8 text
    pub fn read_text(path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(content)
    }

    /// Load one text file as written, a single record or an array
    pub fn read_text_file(path: &Path) -> Result<TextFile> {
        load_text_file(path).with_context(|| format!("Failed to load texts: {}", path.display()))
    }

    /// Load annotated texts from one JSON file
    pub fn read_texts(path: &Path) -> Result<Vec<AnnotatedText>> {
        Self::read_text_file(path).map(TextFile::into_texts)
    }

    /// Load annotated texts from every file, in file order
    pub fn read_all_texts(paths: &[PathBuf]) -> Result<Vec<AnnotatedText>> {
        let mut texts = Vec::new();
        for path in paths {
            texts.extend(Self::read_texts(path)?);
        }
        Ok(texts)
    }

    /// Load stored comparison metrics from a JSON file
    pub fn read_metrics(path: &Path) -> Result<Vec<ComparisonMetric>> {
        load_metrics(path).with_context(|| format!("Failed to load metrics: {}", path.display()))
    }
}
