//! Upload validation.

use crate::error::{PipelineError, PipelineResult};
use lectio_config::StorageConfig;
use lectio_core::FileType;
use std::path::Path;

/// Validate an upload before anything touches storage.
///
/// Checks, in order: non-empty content, non-blank name, extension on the
/// allow-list, size within the configured ceiling (a file exactly at the
/// ceiling passes). Returns the detected file type.
pub fn validate_file(
    filename: &str,
    bytes: &[u8],
    config: &StorageConfig,
) -> PipelineResult<FileType> {
    if bytes.is_empty() {
        return Err(PipelineError::Validation(
            "The uploaded file is empty".to_string(),
        ));
    }

    if filename.trim().is_empty() {
        return Err(PipelineError::Validation(
            "The file name must not be blank".to_string(),
        ));
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let file_type = FileType::from_extension(&extension).filter(|_| {
        config.is_allowed_extension(&extension)
    });
    let Some(file_type) = file_type else {
        return Err(PipelineError::Validation(format!(
            "Only these file types are supported: {}",
            config.allowed_extensions.join(", ")
        )));
    };

    let max_bytes = config.max_file_size_bytes();
    if bytes.len() as u64 > max_bytes {
        return Err(PipelineError::Validation(format!(
            "The file exceeds the size limit of {}",
            config.max_file_size
        )));
    }

    Ok(file_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig {
            max_file_size: "1kb".to_string(),
            ..StorageConfig::default()
        }
    }

    #[test]
    fn test_accepts_allowed_extensions() {
        let cfg = config();
        assert_eq!(validate_file("a.pdf", b"x", &cfg).unwrap(), FileType::Pdf);
        assert_eq!(validate_file("a.DOCX", b"x", &cfg).unwrap(), FileType::Docx);
        assert_eq!(
            validate_file("notes.markdown", b"x", &cfg).unwrap(),
            FileType::Markdown
        );
    }

    #[test]
    fn test_rejects_empty_file() {
        let err = validate_file("a.pdf", b"", &config()).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_rejects_blank_name() {
        let err = validate_file("   ", b"x", &config()).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_rejects_disallowed_extension() {
        let err = validate_file("script.exe", b"x", &config()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("file types"));
    }

    #[test]
    fn test_size_ceiling_boundary() {
        let cfg = config();
        let at_limit = vec![0u8; 1024];
        let over_limit = vec![0u8; 1025];

        assert!(validate_file("a.md", &at_limit, &cfg).is_ok());
        let err = validate_file("a.md", &over_limit, &cfg).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_allow_list_narrower_than_known_types() {
        let cfg = StorageConfig {
            allowed_extensions: vec!["md".to_string()],
            ..StorageConfig::default()
        };
        assert!(validate_file("a.md", b"x", &cfg).is_ok());
        assert!(validate_file("a.pdf", b"x", &cfg).is_err());
    }
}
