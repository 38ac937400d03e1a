//! Lectio Chat - Client for an OpenAI-compatible chat-completions API.
//!
//! This crate provides the two call shapes the pipelines need:
//! - a blocking completion returning the full message content
//! - an SSE streaming completion delivering ordered incremental chunks
//!   over a channel, with an idempotent cancel handle

mod client;
mod error;
mod types;

pub use client::{ChatClient, ChatStream, ChatStreamEvent, StreamHandle};
pub use error::{ChatError, ChatResult};
pub use types::*;
