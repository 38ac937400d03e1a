//! Error types for chat-completion calls.

use thiserror::Error;

/// Errors that can occur when talking to the chat API.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The API key failed local validation; no network call was made.
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// Transport-level failure (connection refused, reset, DNS).
    #[error("Network error: {0}")]
    Network(String),

    /// The call exceeded its configured deadline.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The API answered with a non-2xx status.
    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    /// The API answered 2xx but the first choice's content was blank.
    #[error("Upstream returned empty content")]
    EmptyResponse,

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
