//! Lectio Extract - Text extraction from uploaded documents.
//!
//! This crate provides:
//! - Format-specific parsers (PDF, legacy Word, OOXML Word, Markdown)
//! - Extension-keyed dispatch with an explicit unsupported-format error
//!
//! Extraction is pure and synchronous: same bytes and declared type always
//! yield the same text.

mod error;
mod parsers;

pub use error::{ExtractError, ExtractResult};
pub use parsers::{extract, extract_auto, DocumentParser};
