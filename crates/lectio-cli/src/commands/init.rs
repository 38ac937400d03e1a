//! Init command - create config, prompt templates and database.

use anyhow::{Context, Result};
use colored::Colorize;
use lectio_config::Config;
use lectio_store::Database;

const DEFAULT_GUIDE_PROMPT: &str = include_str!("../../../../prompts/reading_guide.md");
const DEFAULT_CLASSIFY_PROMPT: &str = include_str!("../../../../prompts/classification.md");

/// Run the init command.
pub fn run() -> Result<()> {
    let paths = super::get_paths()?;
    paths.ensure_dirs().context("Failed to create directories")?;

    // Install the default prompt templates next to the config file.
    let prompt_dir = paths.config_dir.join("prompts");
    std::fs::create_dir_all(&prompt_dir).context("Failed to create prompt directory")?;

    let guide_prompt = prompt_dir.join("reading_guide.md");
    let classify_prompt = prompt_dir.join("classification.md");
    if !guide_prompt.exists() {
        std::fs::write(&guide_prompt, DEFAULT_GUIDE_PROMPT)
            .context("Failed to write guide prompt template")?;
    }
    if !classify_prompt.exists() {
        std::fs::write(&classify_prompt, DEFAULT_CLASSIFY_PROMPT)
            .context("Failed to write classification prompt template")?;
    }

    // Write the config with paths resolved for this machine.
    if paths.config_file.exists() {
        println!(
            "{} config already exists at {}",
            "Skipped:".yellow(),
            paths.config_file.display()
        );
    } else {
        let mut config = Config::default();
        config.storage.upload_dir = Some(paths.upload_dir.to_string_lossy().to_string());
        config.ai.guide_prompt_file = guide_prompt.to_string_lossy().to_string();
        config.ai.classify_prompt_file = classify_prompt.to_string_lossy().to_string();
        config
            .save_to(&paths.config_file)
            .context("Failed to write config file")?;
        println!(
            "{} config at {}",
            "Created:".green().bold(),
            paths.config_file.display()
        );
    }

    // Opening the database runs the schema migrations.
    Database::open(&paths.database_file).context("Failed to create database")?;
    println!(
        "{} database at {}",
        "Created:".green().bold(),
        paths.database_file.display()
    );

    println!();
    println!("Next: set {} and run", "LECTIO_API_KEY".cyan());
    println!("  lectio analyze <document.pdf>");

    Ok(())
}
