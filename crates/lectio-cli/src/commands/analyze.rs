//! Analyze command - interactive single-document processing.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lectio_core::{LiteratureStatus, StreamEvent};
use lectio_pipeline::IncomingFile;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long to wait for the detached classification before giving up.
const CLASSIFY_WAIT: Duration = Duration::from_secs(60);

/// Run the analyze command.
pub async fn run(file: &str, api_key: &str, json: bool) -> Result<()> {
    let pipeline = super::build_pipeline()?;

    let path = Path::new(file);
    let incoming = IncomingFile::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if !json {
        println!(
            "{} {} ({})",
            "Analyzing:".cyan().bold(),
            incoming.name,
            super::format_size(incoming.bytes.len() as u64)
        );
        println!("{}", "─".repeat(70));
    }

    let (tx, mut rx) = mpsc::channel(256);
    let runner = {
        let pipeline = pipeline.clone();
        let api_key = api_key.to_string();
        tokio::spawn(async move { pipeline.run_stream(incoming, &api_key, tx).await })
    };

    // Relay events as they arrive; guide fragments go straight to stdout.
    while let Some(event) = rx.recv().await {
        if json {
            println!("{}", serde_json::to_string(&event)?);
            continue;
        }
        match event {
            StreamEvent::Start => {}
            StreamEvent::Progress { message } => {
                println!("{} {}", "•".cyan(), message.dimmed());
            }
            StreamEvent::Content { text } => {
                print!("{}", text);
                std::io::stdout().flush().ok();
            }
            StreamEvent::Complete => {
                println!();
                println!("{}", "─".repeat(70));
            }
            StreamEvent::Error { message } => {
                println!();
                anyhow::bail!("{}", message);
            }
        }
    }

    runner.await.context("Pipeline task panicked")??;

    // The guide is done; classification finishes in the background.
    let records = pipeline.database().list_recent_literature(1)?;
    let Some(record) = records.into_iter().next() else {
        return Ok(());
    };

    let record = if json {
        wait_for_classification(&pipeline, &record.id).await?
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        spinner.set_message("Classifying...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        let record = wait_for_classification(&pipeline, &record.id).await?;
        spinner.finish_and_clear();
        record
    };

    if json {
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("{} {}", "Record:".green().bold(), record.id);
        if let Some(tags) = &record.tags {
            println!("{} {}", "Tags:".green().bold(), tags.join(", "));
        }
        if let Some(description) = &record.description {
            println!("{} {}", "About:".green().bold(), description);
        }
    }

    Ok(())
}

async fn wait_for_classification(
    pipeline: &lectio_pipeline::Pipeline,
    id: &str,
) -> Result<lectio_core::Literature> {
    let deadline = tokio::time::Instant::now() + CLASSIFY_WAIT;
    loop {
        let record = pipeline.database().get_literature(id)?;
        if record.status != LiteratureStatus::Processing || tokio::time::Instant::now() >= deadline
        {
            return Ok(record);
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
