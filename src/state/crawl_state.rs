use crate::listing::{Listing, ListingId};
use std::collections::HashSet;

/// Mutable bookkeeping for one crawl invocation
///
/// Owned by the coordinator for the duration of a single `crawl` call.
/// `crawled` and `listings` only change together through [`CrawlState::record`],
/// so every crawled id has exactly one listing and vice versa.
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Offset of the next search page to request
    offset: u64,

    /// Total reported by the most recent search page; `None` before the first page
    expected_total: Option<u64>,

    /// Identifiers already incorporated into `listings`
    crawled: HashSet<ListingId>,

    /// Enriched listings in discovery order
    listings: Vec<Listing>,
}

impl CrawlState {
    /// Creates the state for a fresh crawl starting at offset 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while another search page should be requested
    ///
    /// Before the first page there is no total yet, so the crawl always starts.
    /// Afterwards both the collected count and the offset must stay below the
    /// latest reported total.
    pub fn should_continue(&self) -> bool {
        match self.expected_total {
            None => true,
            Some(total) => (self.listings.len() as u64) < total && self.offset < total,
        }
    }

    /// Replaces the expected total with the value from the latest page
    pub fn set_expected_total(&mut self, total: u64) {
        self.expected_total = Some(total);
    }

    /// Moves the offset forward by one page
    pub fn advance(&mut self, page_size: u32) {
        self.offset += u64::from(page_size);
    }

    /// Returns true if this identifier has already been recorded
    pub fn is_crawled(&self, id: &ListingId) -> bool {
        self.crawled.contains(id)
    }

    /// Records an enriched listing and its identifier as one step
    ///
    /// Returns false, leaving the state untouched, if the identifier was
    /// already recorded.
    pub fn record(&mut self, listing: Listing) -> bool {
        if !self.crawled.insert(listing.id.clone()) {
            return false;
        }
        self.listings.push(listing);
        true
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn expected_total(&self) -> Option<u64> {
        self.expected_total
    }

    /// Number of listings collected so far
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Size of the crawled-identifier set
    pub fn crawled_count(&self) -> usize {
        self.crawled.len()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Finalizes the crawl, yielding listings in discovery order
    pub fn into_listings(self) -> Vec<Listing> {
        self.listings
    }
}
