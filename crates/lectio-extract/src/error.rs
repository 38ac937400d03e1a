//! Error types for document extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur during text extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction failed for {path}: {message}")]
    ExtractionFailed { path: PathBuf, message: String },
}

impl ExtractError {
    pub(crate) fn failed(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
