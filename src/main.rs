// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Snaptriage: local screenshot triage
//!
//! Watches a folder for new screenshots, runs text extraction and keyword
//! classification on each one, and keeps the records searchable on disk.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use snaptriage::classifier::TriageClassifier;
use snaptriage::config::AppConfig;
use snaptriage::model::{Screenshot, TriageResult};
use snaptriage::ocr::default_extractor;
use snaptriage::pipeline::Pipeline;
use snaptriage::store::ScreenshotStore;
use snaptriage::thumbnail::ImageThumbnailer;
use snaptriage::{Category, Result, SnaptriageError};

/// Snaptriage CLI - Local Screenshot Triage
#[derive(Parser, Debug)]
#[command(name = "snaptriage")]
#[command(version = "0.1.0")]
#[command(about = "Watch a folder for screenshots, classify them, keep them searchable", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch a folder for new screenshots and triage them
    Watch {
        /// Folder to watch (overrides config)
        folder: Option<PathBuf>,
    },

    /// Triage a single image now
    Triage {
        /// Image file to classify
        file: PathBuf,

        /// Use this text instead of running text extraction
        #[arg(long)]
        text: Option<String>,

        /// Persist the result as a screenshot record
        #[arg(long)]
        save: bool,
    },

    /// List stored screenshots, newest first
    List {
        /// Only show this category (stable key, e.g. receiptInvoice)
        #[arg(long)]
        category: Option<String>,

        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Search extracted text of stored screenshots
    Search {
        /// Search query (case-insensitive substring)
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one screenshot record in full
    Show {
        /// Record id
        id: Uuid,
    },

    /// Delete one screenshot record
    Delete {
        /// Record id
        id: Uuid,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if !cli.quiet {
        info!("Snaptriage v0.1.0 - Screenshot Triage");
    }

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Watch { folder }) => run_watch(config, folder).await,
        Some(Commands::Triage { file, text, save }) => {
            run_triage(config, file, text, save, &cli.format).await
        }
        Some(Commands::List { category, limit }) => run_list(config, category, limit, &cli.format),
        Some(Commands::Search { query, limit }) => run_search(config, &query, limit, &cli.format),
        Some(Commands::Show { id }) => run_show(config, id, &cli.format),
        Some(Commands::Delete { id }) => run_delete(config, id),
        Some(Commands::Config { action }) => run_config_command(config, action),
        None => {
            // Default: run watch mode
            run_watch(config, None).await
        }
    }
}

/// Run the watch mode (main triage loop)
async fn run_watch(mut config: AppConfig, folder_override: Option<PathBuf>) -> Result<()> {
    if let Some(folder) = folder_override {
        config.watched_folder = Some(folder);
    }

    let folder = config.watched_folder.clone().ok_or_else(|| {
        SnaptriageError::Config(
            "No watched folder configured. Pass one or set watched_folder in the config"
                .to_string(),
        )
    })?;
    info!("Watched folder: {:?}", folder);

    // Initialize components
    let store = ScreenshotStore::open(&config.storage.path)?;
    info!(
        "Store initialized: {:?} ({} records)",
        config.storage.path,
        store.len()?
    );

    let classifier = TriageClassifier::new(default_extractor(&config));
    info!("Text extractor: {}", classifier.extractor_name());

    let mut pipeline = Pipeline::new(config, store, classifier)
        .with_thumbnailer(Arc::new(ImageThumbnailer::new()));

    pipeline.start_watching().await?;

    // Setup graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = terminate => info!("Received SIGTERM, shutting down..."),
        }

        let _ = shutdown_tx.send(true);
    });

    info!("Triage active. Press Ctrl+C to stop.");
    info!("Waiting for screenshots...");

    let _ = shutdown_rx.changed().await;

    pipeline.stop_watching().await;
    info!("Snaptriage stopped.");
    Ok(())
}

/// Classify one file, optionally persisting the record
async fn run_triage(
    config: AppConfig,
    file: PathBuf,
    text: Option<String>,
    save: bool,
    format: &str,
) -> Result<()> {
    let store = ScreenshotStore::open(&config.storage.path)?;
    let extractor = default_extractor(&config);
    let classifier = TriageClassifier::new(extractor);
    let pipeline = Pipeline::new(config, store, classifier)
        .with_thumbnailer(Arc::new(ImageThumbnailer::new()));

    if save {
        let record = pipeline.ingest(&file, text.as_deref()).await?;
        match format {
            "json" => println!("{}", serde_json::to_string_pretty(&record)?),
            _ => print_screenshot(&record),
        }
    } else {
        let result = pipeline.triage(&file, text.as_deref()).await?;
        match format {
            "json" => println!("{}", serde_json::to_string_pretty(&result)?),
            _ => print_triage(&result),
        }
    }

    Ok(())
}

/// List stored records, newest first
fn run_list(
    config: AppConfig,
    category: Option<String>,
    limit: usize,
    format: &str,
) -> Result<()> {
    let store = ScreenshotStore::open(&config.storage.path)?;

    let records = match category {
        Some(key) => {
            let category = Category::from_key(&key)
                .ok_or_else(|| SnaptriageError::Config(format!("Unknown category: {}", key)))?;
            store.fetch_by_category(category)?
        }
        None => store.fetch_all()?,
    };
    let records: Vec<Screenshot> = records.into_iter().take(limit).collect();

    print_listing(&records, format)
}

/// Search extracted text of stored records
fn run_search(config: AppConfig, query: &str, limit: usize, format: &str) -> Result<()> {
    let store = ScreenshotStore::open(&config.storage.path)?;
    let records: Vec<Screenshot> = store.search(query)?.into_iter().take(limit).collect();

    if format != "json" {
        println!("Search results for '{}':", query);
    }
    print_listing(&records, format)
}

fn run_show(config: AppConfig, id: Uuid, format: &str) -> Result<()> {
    let store = ScreenshotStore::open(&config.storage.path)?;
    let record = store.fetch(id)?.ok_or(SnaptriageError::NotFound(id))?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&record)?),
        _ => print_screenshot(&record),
    }

    Ok(())
}

fn run_delete(config: AppConfig, id: Uuid) -> Result<()> {
    let store = ScreenshotStore::open(&config.storage.path)?;

    if store.delete(id)? {
        println!("Deleted {}", id);
    } else {
        println!("No screenshot with id {}", id);
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
    }

    Ok(())
}

fn print_listing(records: &[Screenshot], format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!("Screenshots ({} shown):", records.len());
    for record in records {
        let category = record
            .triage
            .as_ref()
            .map(|t| t.category.key())
            .unwrap_or("untriaged");
        println!(
            "  {}  {}  {:<16}  {:?}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            category,
            record.file_path
        );
    }

    Ok(())
}

fn print_triage(result: &TriageResult) {
    println!(
        "Category: {} ({:.0}%)",
        result.category.key(),
        result.confidence * 100.0
    );
    if result.extracted_text.is_empty() {
        println!("Extracted text: (none)");
    } else {
        println!("Extracted text: {} chars", result.extracted_text.len());
    }
    if !result.entities.is_empty() {
        println!("Entities:");
        for (key, value) in &result.entities {
            println!("  {}: {}", key, value);
        }
    }
    if !result.sensitivity_flags.is_empty() {
        let flags: Vec<&str> = result.sensitivity_flags.iter().map(|f| f.key()).collect();
        println!("Sensitive: {}", flags.join(", "));
    }
    println!("Processing time: {} ms", result.processing_time_ms);
}

fn print_screenshot(record: &Screenshot) {
    println!("ID: {}", record.id);
    println!("File: {:?}", record.file_path);
    println!("Created: {}", record.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Hash: {}", record.content_hash);
    if let Some(thumbnail) = &record.thumbnail {
        println!("Thumbnail: {} bytes", thumbnail.len());
    }

    match &record.triage {
        Some(triage) => {
            println!();
            print_triage(triage);
        }
        None => println!("Not yet triaged"),
    }

    if let Some(deep) = &record.deep_analysis {
        println!();
        println!("Deep analysis ({}):", deep.model);
        println!("  {}", deep.description);
        for insight in &deep.insights {
            println!("  - {}", insight);
        }
        for action in &deep.suggested_actions {
            println!("  action: {}", action.title_key());
        }
    }
}
