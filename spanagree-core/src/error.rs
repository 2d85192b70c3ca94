//! Error types
//!
//! Scoring itself never fails: malformed annotations become empty span
//! lists and zero denominators have fixed conventions. Errors only come
//! from configuration and from loading or saving files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring the engine or moving records on disk
#[derive(Error, Debug)]
pub enum SpanAgreeError {
    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// File could not be read or written
    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File content is not the expected JSON
    #[error("failed to parse JSON from '{}': {source}", .path.display())]
    Json {
        /// File being parsed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Settings file is not valid TOML for the settings schema
    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for fallible operations in this crate
pub type Result<T> = std::result::Result<T, SpanAgreeError>;
