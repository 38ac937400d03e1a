//! OOXML Word (.docx) document parser.

use super::DocumentParser;
use crate::error::{ExtractError, ExtractResult};
use std::path::Path;
use tracing::debug;

/// Parser for OOXML Word documents.
///
/// Walks the document body collecting run text per paragraph; paragraphs
/// are joined with a single newline each. Non-text content (tables,
/// embedded objects, drawings) is skipped rather than treated as an error.
pub struct DocxParser;

impl DocxParser {
    /// Create a new docx parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for DocxParser {
    fn parse(&self, path: &Path) -> ExtractResult<String> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }

        debug!("Parsing DOCX: {:?}", path);

        let data = std::fs::read(path)?;
        let docx = docx_rs::read_docx(&data)
            .map_err(|e| ExtractError::failed(path, format!("Failed to read docx: {}", e)))?;

        let mut content = String::new();
        for child in docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                for child in paragraph.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(text) = child {
                                content.push_str(&text.text);
                            }
                        }
                    }
                }
                content.push('\n');
            }
        }

        debug!("Extracted {} characters from DOCX", content.len());

        Ok(content)
    }

    fn extensions(&self) -> &[&str] {
        &["docx"]
    }
}
