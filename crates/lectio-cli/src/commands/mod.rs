//! CLI command implementations.

pub mod analyze;
pub mod batch;
pub mod init;
pub mod recent;
pub mod show;

use anyhow::{Context, Result};
use lectio_config::{AppPaths, Config};
use lectio_pipeline::Pipeline;
use lectio_store::{BlobStore, Database};

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load configuration, ensuring lectio is initialized.
pub fn load_config() -> Result<(AppPaths, Config)> {
    let paths = get_paths()?;

    if !paths.is_initialized() {
        anyhow::bail!("Lectio is not initialized. Run 'lectio init' first.");
    }

    let config = Config::load_from(&paths.config_file).context("Failed to load configuration")?;
    Ok((paths, config))
}

/// Open the record store, ensuring lectio is initialized.
pub fn get_database() -> Result<Database> {
    let (paths, _config) = load_config()?;
    Database::open(&paths.database_file).context("Failed to open database")
}

/// Build the full pipeline from configuration.
pub fn build_pipeline() -> Result<Pipeline> {
    let (paths, config) = load_config()?;

    let db = Database::open(&paths.database_file).context("Failed to open database")?;
    let upload_dir = config
        .storage
        .upload_dir
        .clone()
        .map(Into::into)
        .unwrap_or(paths.upload_dir);
    let blobs = BlobStore::new(upload_dir);

    let pipeline = Pipeline::new(config, db, blobs).context("Failed to build pipeline")?;
    // A broken prompt template should surface now, not mid-document.
    pipeline
        .ensure_prompts()
        .context("Failed to load system prompt templates")?;
    Ok(pipeline)
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
