//! Cached system-prompt templates.

use crate::error::{PipelineError, PipelineResult};
use lectio_config::AiConfig;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::info;

/// The two fixed instruction templates used to build chat requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Generate a reading guide for a document.
    Guide,
    /// Classify a reading guide into tags and a description.
    Classify,
}

/// Loads and caches the system prompt templates.
///
/// Each template is read from its configured file on first use and cached
/// for the rest of the process lifetime; templates never change at runtime.
/// One provider is shared by all pipelines in the process.
#[derive(Debug)]
pub struct PromptProvider {
    guide_path: PathBuf,
    classify_path: PathBuf,
    guide: OnceLock<String>,
    classify: OnceLock<String>,
}

impl PromptProvider {
    /// Create a provider reading from the configured template files.
    pub fn from_config(config: &AiConfig) -> Self {
        Self {
            guide_path: PathBuf::from(&config.guide_prompt_file),
            classify_path: PathBuf::from(&config.classify_prompt_file),
            guide: OnceLock::new(),
            classify: OnceLock::new(),
        }
    }

    /// Get the system prompt for the given kind, loading it on first use.
    pub fn system_prompt(&self, kind: PromptKind) -> PipelineResult<&str> {
        let (cache, path) = match kind {
            PromptKind::Guide => (&self.guide, &self.guide_path),
            PromptKind::Classify => (&self.classify, &self.classify_path),
        };

        if let Some(cached) = cache.get() {
            return Ok(cached.as_str());
        }

        let content =
            std::fs::read_to_string(path).map_err(|_| PipelineError::PromptMissing {
                path: path.clone(),
            })?;

        if content.trim().is_empty() {
            return Err(PipelineError::PromptEmpty { path: path.clone() });
        }

        info!(
            "Loaded system prompt from {} ({} chars)",
            path.display(),
            content.len()
        );
        Ok(cache.get_or_init(|| content).as_str())
    }

    /// Load both templates eagerly so a missing or empty file surfaces at
    /// startup instead of on the first document.
    pub fn ensure_loaded(&self) -> PipelineResult<()> {
        self.system_prompt(PromptKind::Guide)?;
        self.system_prompt(PromptKind::Classify)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn provider_with(guide: Option<&str>, classify: Option<&str>) -> (tempfile::TempDir, PromptProvider) {
        let dir = tempfile::tempdir().unwrap();
        let guide_path = dir.path().join("guide.md");
        let classify_path = dir.path().join("classify.md");

        if let Some(text) = guide {
            let mut f = std::fs::File::create(&guide_path).unwrap();
            write!(f, "{}", text).unwrap();
        }
        if let Some(text) = classify {
            let mut f = std::fs::File::create(&classify_path).unwrap();
            write!(f, "{}", text).unwrap();
        }

        let provider = PromptProvider {
            guide_path,
            classify_path,
            guide: OnceLock::new(),
            classify: OnceLock::new(),
        };
        (dir, provider)
    }

    #[test]
    fn test_prompt_loaded_and_cached() {
        let (dir, provider) = provider_with(Some("You write reading guides."), Some("You classify."));

        let first = provider.system_prompt(PromptKind::Guide).unwrap();
        assert_eq!(first, "You write reading guides.");

        // Delete the file: the cached copy must keep serving.
        std::fs::remove_file(dir.path().join("guide.md")).unwrap();
        let second = provider.system_prompt(PromptKind::Guide).unwrap();
        assert_eq!(second, "You write reading guides.");
    }

    #[test]
    fn test_missing_prompt_fails() {
        let (_dir, provider) = provider_with(None, Some("classify"));
        let err = provider.system_prompt(PromptKind::Guide).unwrap_err();
        assert!(matches!(err, PipelineError::PromptMissing { .. }));
    }

    #[test]
    fn test_blank_prompt_fails() {
        let (_dir, provider) = provider_with(Some("   \n  "), Some("classify"));
        let err = provider.system_prompt(PromptKind::Guide).unwrap_err();
        assert!(matches!(err, PipelineError::PromptEmpty { .. }));

        let err = provider.ensure_loaded().unwrap_err();
        assert!(matches!(err, PipelineError::PromptEmpty { .. }));
    }

    #[test]
    fn test_ensure_loaded_checks_both() {
        let (_dir, provider) = provider_with(Some("guide"), None);
        let err = provider.ensure_loaded().unwrap_err();
        assert!(matches!(err, PipelineError::PromptMissing { .. }));
    }
}
