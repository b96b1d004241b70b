//! Rental-Harvest main entry point
//!
//! This is the command-line interface for the Rental-Harvest listing crawler.

use clap::Parser;
use rental_harvest::config::{load_config_with_hash, validate, Config};
use rental_harvest::crawler::crawl;
use rental_harvest::output::DatasetSummary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rental-Harvest: a rate-limited rental listing harvester
///
/// Pages through the listing search for one zip code, scrapes each listing's
/// availability calendar, and writes the deduplicated records as a JSON array.
#[derive(Parser, Debug)]
#[command(name = "rental-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A rate-limited rental listing harvester", long_about = None)]
struct Cli {
    /// Zip code to search listings in
    #[arg(value_name = "ZIP_CODE")]
    zip_code: String,

    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write the dataset here instead of the configured listings path
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(output) = cli.output {
        config.output.listings_path = output;
    }
    validate(&config)?;

    handle_crawl(config, &cli.zip_code).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rental_harvest=info,warn"),
            1 => EnvFilter::new("rental_harvest=debug,info"),
            2 => EnvFilter::new("rental_harvest=trace,debug"),
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

/// Handles the main crawl operation
async fn handle_crawl(config: Config, zip_code: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Calendar months {:?} of {}, request delay {}s + up to {}s",
        config.crawler.calendar_months,
        config.crawler.calendar_year,
        config.crawler.min_delay_secs,
        config.crawler.max_jitter_secs
    );
    tracing::info!("Output: {}", config.output.listings_path);

    match crawl(config, zip_code).await {
        Ok(listings) => {
            let summary = DatasetSummary::from_listings(&listings);
            tracing::info!(
                "Harvest completed: {} listings, {} calendar days ({:.1}% available), {} without price",
                summary.total_listings,
                summary.calendar_days,
                summary.availability_rate(),
                summary.listings_without_price
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
