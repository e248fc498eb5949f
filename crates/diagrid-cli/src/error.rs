//! Error types for the Diagrid CLI.

use std::{ops::Range, path::PathBuf};

use thiserror::Error;

use diagrid::DiagridError;

use crate::config::ConfigError;

/// Everything that can stop the CLI from writing a layout.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unsupported input format: {0} (expected a .json or .toml file)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid graph document {}: {message}", path.display())]
    Document {
        path: PathBuf,
        source_code: String,
        message: String,
        span: Option<Range<usize>>,
    },

    #[error(transparent)]
    Layout(#[from] DiagridError),

    #[error("Failed to serialize layout: {0}")]
    Serialize(#[from] serde_json::Error),
}
