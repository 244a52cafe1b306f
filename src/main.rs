//! Title Scraper main entry point
//!
//! This is the command-line interface for the Title Scraper worker.

use clap::Parser;
use std::path::PathBuf;
use title_scraper::config::{compute_config_hash, load_config_or_default, Config};
use title_scraper::scraper::{default_admission_slots, run_worker};
use tracing_subscriber::EnvFilter;

/// Title Scraper: drains a URL queue and stores page titles
///
/// Pops URLs from the job queue, fetches each page, works out its character
/// encoding, extracts the title (following meta-refresh redirects) and
/// writes it to the title store. Exits once the queue has been idle for the
/// configured timeout.
#[derive(Parser, Debug)]
#[command(name = "title-scraper")]
#[command(version = "1.0.0")]
#[command(about = "Drains a URL queue and stores page titles", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used if it is missing)
    #[arg(short, long, value_name = "CONFIG", default_value = "settings.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration without connecting to anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(&cli.config);
    if let Ok(hash) = compute_config_hash(&cli.config) {
        tracing::info!("Configuration loaded from {} (hash: {})", cli.config.display(), hash);
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match run_worker(&config).await {
        Ok(summary) => {
            tracing::info!("Worker finished: {} jobs dispatched", summary.dispatched);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Worker failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("title_scraper=info,warn"),
            1 => EnvFilter::new("title_scraper=debug,info"),
            2 => EnvFilter::new("title_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the configuration that would be used
fn handle_dry_run(config: &Config) {
    println!("=== Title Scraper Dry Run ===\n");

    println!("Queue:");
    println!("  Host: {}", config.queue.host);
    println!("  Database: {}", config.queue.db);
    println!("  Key: {}", config.queue.key);
    println!("  Idle timeout: {}s", config.queue.idle_timeout);

    println!("\nStore:");
    println!("  Database: {}", config.store.database_path);

    println!("\nScraper:");
    println!("  User agent: {}", config.scraper.user_agent);
    println!("  Connect timeout: {}s", config.scraper.connect_timeout);
    println!("  Request timeout: {}s", config.scraper.request_timeout);
    println!("  Max redirects: {}", config.scraper.max_redirects);

    let slots = config
        .scraper
        .max_concurrent_jobs
        .unwrap_or_else(default_admission_slots);
    println!("  Admission slots: {}", slots);
}
