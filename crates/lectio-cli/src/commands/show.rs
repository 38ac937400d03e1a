//! Show command - full details of one literature record.

use anyhow::{Context, Result};
use colored::Colorize;

/// Run the show command.
pub fn run(id: &str) -> Result<()> {
    let db = super::get_database()?;
    let record = db
        .get_literature(id)
        .with_context(|| format!("No literature record with id {}", id))?;

    println!("{} {}", "ID:".cyan().bold(), record.id);
    println!("{} {}", "Name:".cyan().bold(), record.original_name);
    println!(
        "{} {} ({})",
        "File:".cyan().bold(),
        record.file_type,
        super::format_size(record.size_bytes)
    );
    println!(
        "{} {} characters extracted",
        "Content:".cyan().bold(),
        record.content_length
    );
    println!(
        "{} {}",
        "Status:".cyan().bold(),
        record.status.description()
    );
    println!(
        "{} {}",
        "Created:".cyan().bold(),
        record.created_at.format("%Y-%m-%d %H:%M")
    );

    if let Some(tags) = &record.tags {
        println!("{} {}", "Tags:".cyan().bold(), tags.join(", "));
    }
    if let Some(description) = &record.description {
        println!("{} {}", "About:".cyan().bold(), description);
    }
    if let Some(guide) = &record.reading_guide {
        println!();
        println!("{}", "Reading guide".cyan().bold());
        println!("{}", "─".repeat(70));
        println!("{}", guide);
    }

    Ok(())
}
