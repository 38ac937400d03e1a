//! Markdown document parser.

use super::DocumentParser;
use crate::error::{ExtractError, ExtractResult};
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;

/// Parser for Markdown files.
///
/// Parses to the CommonMark event stream and renders plain text: markup is
/// stripped, prose and ordering are preserved, links and images reduce to
/// their visible text.
pub struct MarkdownParser;

impl MarkdownParser {
    /// Create a new markdown parser.
    pub fn new() -> Self {
        Self
    }

    /// Render markdown source to plain text.
    fn render_text(&self, markdown: &str) -> String {
        let parser = Parser::new(markdown);
        let mut text = String::new();

        for event in parser {
            match event {
                Event::Text(t) => {
                    text.push_str(&t);
                }
                Event::Code(code) => {
                    text.push_str(&code);
                }
                Event::SoftBreak | Event::HardBreak => {
                    text.push('\n');
                }
                Event::End(Tag::Heading(..)) | Event::End(Tag::Paragraph) => {
                    text.push_str("\n\n");
                }
                Event::End(Tag::Item) => {
                    text.push('\n');
                }
                Event::End(Tag::List(_)) | Event::End(Tag::CodeBlock(_)) => {
                    text.push('\n');
                }
                Event::Rule => {
                    text.push('\n');
                }
                _ => {}
            }
        }

        text.trim().to_string()
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for MarkdownParser {
    fn parse(&self, path: &Path) -> ExtractResult<String> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Ok(self.render_text(&content))
    }

    fn extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_markdown_strips_markup() {
        let mut file = NamedTempFile::with_suffix(".md").unwrap();
        writeln!(
            file,
            r#"# My Document

This is a paragraph with **bold** text and a [link](https://example.com).

## Section One

- Item one
- Item two

Some `inline code` too.
"#
        )
        .unwrap();

        let parser = MarkdownParser::new();
        let text = parser.parse(file.path()).unwrap();

        assert!(text.contains("My Document"));
        assert!(text.contains("This is a paragraph with bold text and a link."));
        assert!(text.contains("Item one\nItem two"));
        assert!(text.contains("inline code"));
        // Markup characters are gone
        assert!(!text.contains('#'));
        assert!(!text.contains("**"));
        assert!(!text.contains("https://example.com"));
    }

    #[test]
    fn test_image_reduces_to_alt_text() {
        let mut file = NamedTempFile::with_suffix(".md").unwrap();
        writeln!(file, "Before ![a diagram](fig.png) after.").unwrap();

        let parser = MarkdownParser::new();
        let text = parser.parse(file.path()).unwrap();

        assert!(text.contains("a diagram"));
        assert!(!text.contains("fig.png"));
    }

    #[test]
    fn test_sequencing_preserved() {
        let mut file = NamedTempFile::with_suffix(".md").unwrap();
        writeln!(file, "First.\n\nSecond.\n\nThird.").unwrap();

        let parser = MarkdownParser::new();
        let text = parser.parse(file.path()).unwrap();

        let first = text.find("First.").unwrap();
        let second = text.find("Second.").unwrap();
        let third = text.find("Third.").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_markdown_parser_extensions() {
        let parser = MarkdownParser::new();
        assert!(parser.supports("md"));
        assert!(parser.supports("markdown"));
        assert!(parser.supports("MD"));
        assert!(!parser.supports("txt"));
    }
}
