//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Lectio Configuration
# Document ingestion and AI reading-guide generation

[storage]
# Directory for uploaded documents
# upload_dir = "./uploads/documents"

# File extensions accepted for ingestion
allowed_extensions = ["pdf", "doc", "docx", "md", "markdown"]

# Maximum upload size (supports kb/mb/gb suffixes)
max_file_size = "10MB"

[ai]
# Chat completions endpoint (OpenAI-compatible)
base_url = "https://api.moonshot.cn/v1"

# Model used for guide generation and classification
model = "moonshot-v1-8k"

# Token budget for guide generation
max_tokens = 4000

# Sampling temperature for guide generation
temperature = 0.7

# Connect timeout for the upstream API (seconds)
connect_timeout_seconds = 30

# Timeout for one blocking completion call (seconds)
request_timeout_seconds = 300

# Ceiling for one interactive document flow (seconds)
stream_timeout_seconds = 600

# System prompt template files
guide_prompt_file = "prompts/reading_guide.md"
classify_prompt_file = "prompts/classification.md"

[batch]
# Maximum files accepted in one batch import
max_files = 16

# Ceiling for a whole batch run (seconds)
timeout_seconds = 1800
"#
        .to_string()
    }
}

/// File storage and validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for uploaded documents. Defaults to a platform data dir
    /// when unset.
    pub upload_dir: Option<String>,
    pub allowed_extensions: Vec<String>,
    /// Human-readable size limit, e.g. "10MB".
    pub max_file_size: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: None,
            allowed_extensions: vec![
                "pdf".to_string(),
                "doc".to_string(),
                "docx".to_string(),
                "md".to_string(),
                "markdown".to_string(),
            ],
            max_file_size: "10MB".to_string(),
        }
    }
}

impl StorageConfig {
    /// The upload ceiling in bytes. Unparseable values fall back to 10 MB.
    pub fn max_file_size_bytes(&self) -> u64 {
        parse_file_size(&self.max_file_size).unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Whether an extension is on the allow-list (case-insensitive).
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// Upstream chat API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub connect_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
    pub stream_timeout_seconds: u64,
    pub guide_prompt_file: String,
    pub classify_prompt_file: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.moonshot.cn/v1".to_string(),
            model: "moonshot-v1-8k".to_string(),
            max_tokens: 4000,
            temperature: 0.7,
            connect_timeout_seconds: 30,
            request_timeout_seconds: 300,
            stream_timeout_seconds: 600,
            guide_prompt_file: "prompts/reading_guide.md".to_string(),
            classify_prompt_file: "prompts/classification.md".to_string(),
        }
    }
}

/// Batch import settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_files: usize,
    pub timeout_seconds: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_files: 16,
            timeout_seconds: 1800,
        }
    }
}

/// Parse a human file-size string such as "10MB", "512kb" or "1048576".
pub fn parse_file_size(size: &str) -> Option<u64> {
    let size = size.trim().to_lowercase();
    if size.is_empty() {
        return None;
    }

    let (digits, multiplier) = if let Some(stripped) = size.strip_suffix("kb") {
        (stripped, 1024u64)
    } else if let Some(stripped) = size.strip_suffix("mb") {
        (stripped, 1024 * 1024)
    } else if let Some(stripped) = size.strip_suffix("gb") {
        (stripped, 1024 * 1024 * 1024)
    } else {
        (size.as_str(), 1)
    };

    digits
        .trim()
        .parse::<u64>()
        .ok()
        .map(|n| n * multiplier)
}
