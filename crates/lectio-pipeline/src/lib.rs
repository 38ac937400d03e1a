//! Lectio Pipeline - Ingestion and AI orchestration.
//!
//! This crate provides:
//! - Upload validation (extension allow-list, size ceiling)
//! - The interactive single-document pipeline: store, extract, stream the
//!   reading guide to an event sink, then classify in a detached task
//! - The batch pipeline: one task per file, blocking guide calls, atomic
//!   completion counting, a single terminal event
//! - The cached system-prompt provider

mod ai;
mod batch;
mod error;
mod pipeline;
mod prompts;
mod validate;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::{IncomingFile, Pipeline};
pub use prompts::{PromptKind, PromptProvider};
pub use validate::validate_file;
