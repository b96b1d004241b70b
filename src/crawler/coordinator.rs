//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop, which:
//! - Pages through the search endpoint for one zip code
//! - Re-reads the expected total from every page
//! - Skips listings whose id was already recorded
//! - Normalizes each new listing and attaches its calendar
//! - Stops on an empty page or once count or offset reaches the total
//!
//! Every request goes through one [`Fetcher`], one at a time. Any error
//! aborts the crawl; partial results are dropped with it.

use crate::config::Config;
use crate::crawler::calendar::parse_calendar;
use crate::crawler::fetcher::{FetchOptions, Fetcher};
use crate::listing::{listing_id, normalize, Calendar, Listing, ListingId};
use crate::state::CrawlState;
use crate::url::{calendar_url, search_referer, search_url};
use crate::{CalendarError, HarvestError};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Longest slice of a bad payload carried in an error
const PAYLOAD_CONTEXT_CHARS: usize = 500;

/// One search-results page as served by the API
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    /// Current upstream total; may differ from page to page
    pub listings_count: u64,

    pub listings: Vec<SearchEntry>,
}

/// Wrapper around each raw listing in a search page
#[derive(Debug, Deserialize)]
pub struct SearchEntry {
    pub listing: Value,
}

/// Parses a search-page body
///
/// The error keeps the start of the payload so the failure can be logged with
/// what upstream actually sent.
pub fn parse_search_page(url: &Url, body: &str) -> Result<SearchPage, HarvestError> {
    serde_json::from_str(body).map_err(|e| HarvestError::MalformedPage {
        url: url.to_string(),
        message: e.to_string(),
        payload: body.chars().take(PAYLOAD_CONTEXT_CHARS).collect(),
    })
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    fetcher: Fetcher,
}

impl Coordinator {
    /// Creates a new coordinator with a fresh session
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(&config.endpoints.user_agent)?;
        Ok(Self { config, fetcher })
    }

    /// Crawls every listing for `zip_code`
    ///
    /// Returns the enriched listings in discovery order.
    pub async fn run(&mut self, zip_code: &str) -> Result<Vec<Listing>, HarvestError> {
        tracing::info!("Starting crawl for zip code {}", zip_code);
        let start_time = std::time::Instant::now();

        let mut state = CrawlState::new();
        let referer = search_referer(&self.config.endpoints, zip_code)?;
        let page_size = self.config.crawler.page_size;

        while state.should_continue() {
            let page_url = search_url(
                &self.config.endpoints,
                &self.config.crawler,
                zip_code,
                state.offset(),
            )?;

            let options =
                FetchOptions::from_config(&self.config.crawler).with_referer(referer.as_str());
            let body = self.fetcher.get(&page_url, &options).await?;
            let page = parse_search_page(&page_url, &body)?;

            state.set_expected_total(page.listings_count);

            if page.listings.is_empty() {
                tracing::info!("Empty page at offset {}, end of results", state.offset());
                break;
            }

            let before = state.len();
            self.process_page(&mut state, &page_url, &page.listings).await?;

            tracing::info!(
                "Offset {}: {} listings on page, {} new, {} of {} collected",
                state.offset(),
                page.listings.len(),
                state.len() - before,
                state.len(),
                page.listings_count
            );

            state.advance(page_size);
            tracing::debug!("New offset {}", state.offset());
        }

        tracing::info!(
            "Crawl completed: {} listings in {:?} ({} requests)",
            state.len(),
            start_time.elapsed(),
            self.fetcher.request_count()
        );

        Ok(state.into_listings())
    }

    /// Records every listing on the page that has not been seen yet
    ///
    /// Each new listing is fully enriched and recorded before the next entry
    /// is looked at, so duplicates within the same page are caught too.
    async fn process_page(
        &mut self,
        state: &mut CrawlState,
        page_url: &Url,
        entries: &[SearchEntry],
    ) -> Result<(), HarvestError> {
        for entry in entries {
            let id = listing_id(&entry.listing)?;
            if state.is_crawled(&id) {
                tracing::debug!("Skipping already crawled listing {}", id);
                continue;
            }

            let listing = normalize(&entry.listing)?;
            let calendar = self.fetch_calendar(&listing.id, page_url).await?;
            state.record(listing.with_calendar(calendar));
        }

        Ok(())
    }

    /// Fetches and parses the configured calendar months for one listing
    async fn fetch_calendar(
        &mut self,
        id: &ListingId,
        referer: &Url,
    ) -> Result<Calendar, HarvestError> {
        let year = self.config.crawler.calendar_year;
        let options = FetchOptions::from_config(&self.config.crawler)
            .with_referer(referer.as_str())
            .with_xhr(true);

        let mut calendar = Calendar::new();
        for &month in &self.config.crawler.calendar_months {
            let url = calendar_url(&self.config.endpoints, &self.config.crawler, id, month)?;
            let html = self.fetcher.get(&url, &options).await?;

            let calendar_error = |source: CalendarError| HarvestError::Calendar {
                listing: id.to_string(),
                month,
                year,
                source,
            };
            let month_calendar = parse_calendar(&html, month, year).map_err(calendar_error)?;
            calendar.merge(month_calendar).map_err(calendar_error)?;
        }

        tracing::debug!(
            "Listing {}: {} days, {} available",
            id,
            calendar.len(),
            calendar.available_days()
        );
        Ok(calendar)
    }

    /// The fetcher shared by every request of this coordinator
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }
}

/// Runs a crawl for one zip code without persisting the result
pub async fn run_crawl(config: Config, zip_code: &str) -> Result<Vec<Listing>, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run(zip_code).await
}
