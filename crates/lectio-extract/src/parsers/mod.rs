//! Document parsers for the supported file types.

mod doc;
mod docx;
mod markdown;
mod pdf;

pub use doc::DocParser;
pub use docx::DocxParser;
pub use markdown::MarkdownParser;
pub use pdf::PdfParser;

use crate::error::{ExtractError, ExtractResult};
use lectio_core::FileType;
use std::path::Path;

/// Trait for document parsers.
pub trait DocumentParser: Send + Sync {
    /// Extract plain text from the file at the given path.
    fn parse(&self, path: &Path) -> ExtractResult<String>;

    /// Get the supported file extensions.
    fn extensions(&self) -> &[&str];

    /// Check if this parser supports the given extension.
    fn supports(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Extract text using the parser for the declared file type.
pub fn extract(path: &Path, declared: FileType) -> ExtractResult<String> {
    match declared {
        FileType::Pdf => PdfParser::new().parse(path),
        FileType::Doc => DocParser::new().parse(path),
        FileType::Docx => DocxParser::new().parse(path),
        FileType::Markdown => MarkdownParser::new().parse(path),
    }
}

/// Extract text, detecting the format from the file extension.
///
/// Unknown extensions fail with [`ExtractError::UnsupportedFormat`] rather
/// than falling through to a default parser.
pub fn extract_auto(path: &Path) -> ExtractResult<String> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let file_type = FileType::from_extension(extension)
        .ok_or_else(|| ExtractError::UnsupportedFormat(extension.to_string()))?;

    extract(path, file_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_auto_unsupported() {
        let err = extract_auto(Path::new("file.exe")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ext) if ext == "exe"));

        let err = extract_auto(Path::new("no_extension")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ext) if ext.is_empty()));
    }

    #[test]
    fn test_extension_dispatch_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NOTES.MD");
        std::fs::write(&path, "# Title\n\nBody text.").unwrap();

        let text = extract_auto(&path).unwrap();
        assert!(text.contains("Body text."));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "Some *emphasised* prose.").unwrap();

        let first = extract(&path, lectio_core::FileType::Markdown).unwrap();
        let second = extract(&path, lectio_core::FileType::Markdown).unwrap();
        assert_eq!(first, second);
    }
}
