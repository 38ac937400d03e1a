//! Batch command - concurrent import of many documents.

use anyhow::{Context, Result};
use colored::Colorize;
use lectio_core::{BatchEvent, FileType};
use lectio_pipeline::IncomingFile;
use std::path::Path;
use tokio::sync::mpsc;
use walkdir::WalkDir;

/// Run the batch command.
pub async fn run(paths: &[String], api_key: &str, json: bool) -> Result<()> {
    if paths.is_empty() {
        anyhow::bail!("No files or directories given");
    }

    let pipeline = super::build_pipeline()?;

    let mut files = Vec::new();
    for path in paths {
        collect_files(Path::new(path), &mut files)?;
    }
    if files.is_empty() {
        anyhow::bail!("No supported documents found (pdf, doc, docx, md)");
    }

    if !json {
        println!(
            "{} {} file(s)",
            "Importing:".cyan().bold(),
            files.len()
        );
    }

    let (tx, mut rx) = mpsc::channel(256);
    let runner = {
        let pipeline = pipeline.clone();
        let api_key = api_key.to_string();
        tokio::spawn(async move { pipeline.run_batch(files, &api_key, tx).await })
    };

    let mut error_count = 0usize;
    while let Some(event) = rx.recv().await {
        if json {
            println!("{}", serde_json::to_string(&event)?);
            continue;
        }
        match event {
            BatchEvent::BatchStart { total } => {
                println!("{} processing {} file(s)", "•".cyan(), total);
            }
            BatchEvent::FileStart { index, filename } => {
                println!("{} [{}] {}", "•".cyan(), index, filename.dimmed());
            }
            BatchEvent::FileSaved { index, literature_id } => {
                println!(
                    "{} [{}] saved as {}",
                    "•".cyan(),
                    index,
                    literature_id.dimmed()
                );
            }
            BatchEvent::FileComplete {
                index,
                completed,
                total,
                ..
            } => {
                println!(
                    "{} [{}] done ({}/{})",
                    "✓".green().bold(),
                    index,
                    completed,
                    total
                );
            }
            BatchEvent::FileError {
                index,
                filename,
                error,
                completed,
                total,
            } => {
                error_count += 1;
                println!(
                    "{} [{}] {} failed: {} ({}/{})",
                    "✗".red().bold(),
                    index,
                    filename,
                    error,
                    completed,
                    total
                );
            }
            BatchEvent::BatchComplete { total, errors } => {
                println!(
                    "{} {} file(s), {} error(s)",
                    "Batch complete:".green().bold(),
                    total,
                    errors
                );
            }
        }
    }

    runner.await.context("Batch task panicked")??;

    if !json && error_count > 0 {
        println!(
            "{} inspect failures with 'lectio recent'",
            "Note:".yellow()
        );
    }

    Ok(())
}

/// Expand files and directories into the upload list, skipping hidden files
/// and unsupported extensions.
fn collect_files(path: &Path, files: &mut Vec<IncomingFile>) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    if path.is_file() {
        files.push(
            IncomingFile::from_path(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        );
        return Ok(());
    }

    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let entry_path = entry.path();

        if entry_path.is_dir() {
            continue;
        }

        // Skip hidden files
        if entry_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false)
        {
            continue;
        }

        let supported = entry_path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FileType::from_extension)
            .is_some();
        if supported {
            files.push(
                IncomingFile::from_path(entry_path)
                    .with_context(|| format!("Failed to read {}", entry_path.display()))?,
            );
        }
    }

    Ok(())
}
