//! Rental-Harvest: a rate-limited rental listing harvester
//!
//! This crate pages through a listing search API for one zip code, enriches
//! every newly discovered listing with a per-day availability calendar scraped
//! from an HTML widget, and writes the deduplicated result as a JSON dataset.

pub mod config;
pub mod crawler;
pub mod listing;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Rental-Harvest operations
///
/// Every variant is terminal for the whole crawl. Nothing is retried.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Could not parse search response from {url}: {message} (payload: {payload})")]
    MalformedPage {
        url: String,
        message: String,
        payload: String,
    },

    #[error("Malformed calendar for listing {listing} ({month}/{year}): {source}")]
    Calendar {
        listing: String,
        month: u32,
        year: i32,
        #[source]
        source: CalendarError,
    },

    #[error("Malformed listing: {0}")]
    Listing(#[from] NormalizeError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL construction errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("URL cannot carry a path: {0}")]
    CannotBeBase(String),
}

/// HTTP fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Calendar widget parse errors
///
/// `cell` is the zero-based index of the offending `<td>` in document order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("cell {cell} contains {found} spans, expected exactly one: {html}")]
    CellSpanCount {
        cell: usize,
        found: usize,
        html: String,
    },

    #[error("cell {cell} holds non-numeric day '{text}'")]
    DayNotNumeric { cell: usize, text: String },

    #[error("cell {cell} holds invalid day {day}")]
    DayOutOfRange { cell: usize, day: u32 },

    #[error("cell {cell} (day {day}) is neither available nor unavailable: [{classes}]")]
    AmbiguousAvailability {
        cell: usize,
        day: u32,
        classes: String,
    },

    #[error("date {date} already present in calendar")]
    DuplicateDate { date: String },
}

/// Listing normalization errors
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("listing entry has no 'id'")]
    MissingId,

    #[error("listing 'id' must be a non-negative integer or a string, got {value}")]
    InvalidId { value: String },
}

/// Result type alias for Rental-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use listing::{Calendar, CalendarDate, Listing, ListingId};
pub use state::CrawlState;
