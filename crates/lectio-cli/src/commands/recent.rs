//! Recent command - list the latest literature records.

use anyhow::Result;
use colored::Colorize;

/// Guide summary length for list display.
const SUMMARY_CHARS: usize = 200;

/// Run the recent command.
pub fn run(limit: i64) -> Result<()> {
    let db = super::get_database()?;
    let records = db.list_recent_literature(limit)?;

    if records.is_empty() {
        println!("No literature yet. Import something with 'lectio analyze' or 'lectio batch'.");
        return Ok(());
    }

    for record in records {
        let status = match record.status {
            lectio_core::LiteratureStatus::Completed => record.status.description().green(),
            lectio_core::LiteratureStatus::Failed => record.status.description().red(),
            lectio_core::LiteratureStatus::Processing => record.status.description().yellow(),
        };

        println!(
            "{}  {} [{}] {}",
            record.created_at.format("%Y-%m-%d %H:%M"),
            &record.id[..8],
            status,
            record.original_name.bold()
        );
        println!(
            "          {} · {} chars",
            super::format_size(record.size_bytes),
            record.content_length
        );
        if let Some(tags) = &record.tags {
            println!("          {}", tags.join(", ").cyan());
        }
        if let Some(summary) = record.guide_summary(SUMMARY_CHARS) {
            println!("          {}", summary.replace('\n', " ").dimmed());
        }
        println!();
    }

    Ok(())
}
