//! Output handler traits and types
//!
//! This module defines the trait interface for dataset writers and a small
//! summary computed over the harvested listings.

use crate::listing::Listing;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize dataset: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary statistics for a harvested dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSummary {
    pub total_listings: usize,

    /// Listings whose search record carried no price
    pub listings_without_price: usize,

    /// Calendar days recorded across all listings
    pub calendar_days: usize,

    /// Calendar days marked available across all listings
    pub available_days: usize,
}

impl DatasetSummary {
    /// Computes the summary of a listing collection
    pub fn from_listings(listings: &[Listing]) -> Self {
        let mut summary = Self {
            total_listings: listings.len(),
            ..Self::default()
        };

        for listing in listings {
            if listing.price.is_none() {
                summary.listings_without_price += 1;
            }
            if let Some(calendar) = &listing.calendar {
                summary.calendar_days += calendar.len();
                summary.available_days += calendar.available_days();
            }
        }

        summary
    }

    /// Returns the share of calendar days that are available, as a percentage
    pub fn availability_rate(&self) -> f64 {
        if self.calendar_days == 0 {
            return 0.0;
        }
        (self.available_days as f64 / self.calendar_days as f64) * 100.0
    }
}

/// Trait for dataset writers
///
/// A writer receives the complete listing collection once, at the end of a
/// successful crawl.
pub trait OutputHandler {
    /// Persists the listings in discovery order
    fn write(&mut self, listings: &[Listing]) -> OutputResult<()>;

    /// Human-readable description of where the dataset goes
    fn destination(&self) -> String;
}
