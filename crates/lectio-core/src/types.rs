//! Core domain types for lectio.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for literature records.
pub type LiteratureId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Supported document formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Doc,
    Docx,
    Markdown,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Doc => "doc",
            FileType::Docx => "docx",
            FileType::Markdown => "md",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Some(FileType::Pdf),
            "doc" => Some(FileType::Doc),
            "docx" => Some(FileType::Docx),
            "md" | "markdown" => Some(FileType::Markdown),
            _ => None,
        }
    }

    /// Detect the document format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::from_str(ext)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing state of a literature record.
///
/// `Processing` is the initial state. Guide generation failure (or a blank
/// guide) moves the record to `Failed`. Once the guide is stored the record
/// always ends up `Completed`, even when the follow-up classification call
/// fails - the guide is the primary artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LiteratureStatus {
    #[default]
    Processing,
    Completed,
    Failed,
}

impl LiteratureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiteratureStatus::Processing => "processing",
            LiteratureStatus::Completed => "completed",
            LiteratureStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "processing" => Some(LiteratureStatus::Processing),
            "completed" => Some(LiteratureStatus::Completed),
            "failed" => Some(LiteratureStatus::Failed),
            _ => None,
        }
    }

    /// Human-readable description for display.
    pub fn description(&self) -> &'static str {
        match self {
            LiteratureStatus::Processing => "processing",
            LiteratureStatus::Completed => "completed",
            LiteratureStatus::Failed => "processing failed",
        }
    }
}

impl std::fmt::Display for LiteratureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ingested document and everything generated for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Literature {
    pub id: LiteratureId,
    pub original_name: String,
    pub storage_path: String,
    pub size_bytes: u64,
    pub file_type: FileType,
    /// Character count of the extracted text.
    pub content_length: usize,
    /// AI-generated reading guide. Written exactly once, never overwritten
    /// by a failed classification attempt.
    pub reading_guide: Option<String>,
    /// Classification tags in model output order. Set together with
    /// `description`, never partially.
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
    pub status: LiteratureStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Literature {
    pub fn new(
        original_name: impl Into<String>,
        storage_path: impl Into<String>,
        size_bytes: u64,
        file_type: FileType,
        content_length: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            original_name: original_name.into(),
            storage_path: storage_path.into(),
            size_bytes,
            file_type,
            content_length,
            reading_guide: None,
            tags: None,
            description: None,
            status: LiteratureStatus::Processing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Guide text truncated for list display.
    pub fn guide_summary(&self, max_chars: usize) -> Option<String> {
        self.reading_guide.as_ref().map(|guide| {
            if guide.chars().count() > max_chars {
                let truncated: String = guide.chars().take(max_chars).collect();
                format!("{}...", truncated)
            } else {
                guide.clone()
            }
        })
    }
}

/// Classification result returned by the model in structured-output mode.
///
/// The field is literally named `desc` on the wire - that is what the
/// classification prompt asks the model to emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub tags: Vec<String>,
    pub desc: String,
}
