//! spanagree CLI library
//!
//! Batch tooling around `spanagree-core`: scoring annotated texts,
//! recalculating stored position accuracy and repairing stale offsets.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
