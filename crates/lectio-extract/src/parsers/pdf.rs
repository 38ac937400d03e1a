//! PDF document parser.

use super::DocumentParser;
use crate::error::{ExtractError, ExtractResult};
use std::path::Path;
use tracing::debug;

/// Parser for PDF files.
///
/// Pages are extracted in reading order and concatenated exactly as the
/// layout engine emits them; no separators are added.
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for PdfParser {
    fn parse(&self, path: &Path) -> ExtractResult<String> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }

        debug!("Parsing PDF: {:?}", path);

        let content = pdf_extract::extract_text(path)
            .map_err(|e| ExtractError::failed(path, format!("PDF text extraction failed: {}", e)))?;

        debug!("Extracted {} characters from PDF", content.len());

        Ok(content)
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }
}
