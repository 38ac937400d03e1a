//! Progress events emitted by the processing pipelines.
//!
//! Each event serializes as a small tagged JSON object, e.g.
//! `{"event":"content","text":" partial"}`. Within one document's stream the
//! order is exactly the order of production; across documents in a batch no
//! ordering is guaranteed and consumers key on `index` / `literature_id`.

use serde::{Deserialize, Serialize};

use crate::LiteratureId;

/// Events for the interactive single-document flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Processing has begun.
    Start,
    /// A coarse milestone, e.g. "file saved".
    Progress { message: String },
    /// One incremental guide fragment, forwarded as received from the
    /// model. May be empty or whitespace-only; both are meaningful.
    Content { text: String },
    /// Guide generation finished.
    Complete,
    /// Processing failed; the stream ends after this event.
    Error { message: String },
}

/// Events for the batch import flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    BatchStart {
        total: usize,
    },
    FileStart {
        index: usize,
        filename: String,
    },
    FileSaved {
        index: usize,
        literature_id: LiteratureId,
    },
    FileComplete {
        index: usize,
        literature_id: LiteratureId,
        completed: usize,
        total: usize,
    },
    FileError {
        index: usize,
        filename: String,
        error: String,
        completed: usize,
        total: usize,
    },
    /// Emitted exactly once, when every file has been accounted for.
    BatchComplete {
        total: usize,
        errors: usize,
    },
}
