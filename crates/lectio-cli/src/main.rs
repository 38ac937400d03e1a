//! Lectio CLI - AI reading guides for your document library.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Lectio - AI reading guides for your document library
#[derive(Parser)]
#[command(name = "lectio")]
#[command(version)]
#[command(about = "AI reading guides for your document library", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize lectio (create config, prompts and database)
    Init,

    /// Analyze one document and stream its reading guide to the terminal
    Analyze {
        /// Path to the document (pdf, doc, docx, md)
        file: String,

        /// API key for the chat endpoint
        #[arg(short, long, env = "LECTIO_API_KEY")]
        api_key: String,

        /// Emit raw JSON event lines instead of formatted output
        #[arg(long)]
        json: bool,
    },

    /// Import a batch of documents (files or directories)
    Batch {
        /// Files or directories to import
        paths: Vec<String>,

        /// API key for the chat endpoint
        #[arg(short, long, env = "LECTIO_API_KEY")]
        api_key: String,

        /// Emit raw JSON event lines instead of formatted output
        #[arg(long)]
        json: bool,
    },

    /// Show details of a literature record
    Show {
        /// Record ID
        id: String,
    },

    /// List recent literature records
    Recent {
        /// Maximum number of records to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Analyze { file, api_key, json } => {
            commands::analyze::run(&file, &api_key, json).await
        }
        Commands::Batch { paths, api_key, json } => {
            commands::batch::run(&paths, &api_key, json).await
        }
        Commands::Show { id } => commands::show::run(&id),
        Commands::Recent { limit } => commands::recent::run(limit),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
