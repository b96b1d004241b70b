//! Crawler module for listing discovery and enrichment
//!
//! This module contains the core crawling logic, including:
//! - Throttled HTTP fetching with session continuity
//! - Calendar widget parsing
//! - Search pagination, deduplication, and enrichment

mod calendar;
mod coordinator;
mod fetcher;

pub use calendar::{parse_calendar, MonthTracking};
pub use coordinator::{parse_search_page, run_crawl, Coordinator, SearchEntry, SearchPage};
pub use fetcher::{build_http_client, draw_delay, FetchOptions, Fetcher, Session, XHR_HEADER};

use crate::config::Config;
use crate::listing::Listing;
use crate::output::{JsonOutputHandler, OutputHandler};
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for a harvest. It will:
/// 1. Build the fetcher and an empty session
/// 2. Page through the search results for `zip_code`
/// 3. Enrich every new listing with its calendar
/// 4. Write the dataset to the configured output path
///
/// Nothing is written if the crawl fails.
///
/// # Returns
///
/// * `Ok(Vec<Listing>)` - The listings that were written
/// * `Err(HarvestError)` - Crawl or write failed
pub async fn crawl(config: Config, zip_code: &str) -> Result<Vec<Listing>, HarvestError> {
    let mut handler = JsonOutputHandler::new(&config.output.listings_path);
    tracing::debug!("Dataset destination: {}", handler.destination());

    let listings = run_crawl(config, zip_code).await?;
    handler.write(&listings)?;
    Ok(listings)
}
