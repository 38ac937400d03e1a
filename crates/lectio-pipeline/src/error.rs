//! Error types for the processing pipelines.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur while processing a document.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Bad input; surfaced verbatim to the caller, never retried.
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] lectio_store::StoreError),

    #[error(transparent)]
    Extraction(#[from] lectio_extract::ExtractError),

    #[error(transparent)]
    Chat(#[from] lectio_chat::ChatError),

    /// The guide stream failed mid-flight.
    #[error("Guide generation failed: {0}")]
    Generation(String),

    /// The stream finished but the accumulated guide was blank.
    #[error("Generated reading guide was empty")]
    EmptyGuide,

    #[error("Processing exceeded the {seconds} second ceiling")]
    Timeout { seconds: u64 },

    #[error("System prompt file not found: {path}")]
    PromptMissing { path: PathBuf },

    #[error("System prompt file is empty: {path}")]
    PromptEmpty { path: PathBuf },
}
