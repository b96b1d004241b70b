use serde::Deserialize;
use std::time::Duration;

/// Mobile browser user agent sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Linux; U; Android 2.3; en-us) AppleWebKit/999+ (KHTML, like Gecko) Safari/999.9";

/// Main configuration structure for Rental-Harvest
///
/// Every section falls back to its defaults, so an empty file (or no file at
/// all) yields a working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub endpoints: EndpointConfig,
    pub output: OutputConfig,
}

/// Crawl pacing and calendar window
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Listings requested per search page; also the offset increment
    pub page_size: u32,

    /// Guest count sent with every search
    pub guests: u32,

    /// Minimum sleep before each request (seconds)
    pub min_delay_secs: u64,

    /// Upper bound of the random extra sleep added to the minimum (seconds)
    pub max_jitter_secs: u64,

    /// Months whose calendars are fetched for every listing
    pub calendar_months: Vec<u32>,

    /// Year the calendar months belong to
    pub calendar_year: i32,

    /// Currency passed to the calendar widget
    pub currency: String,
}

impl CrawlerConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_secs(self.min_delay_secs)
    }

    pub fn max_jitter(&self) -> Duration {
        Duration::from_secs(self.max_jitter_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            guests: 1,
            min_delay_secs: 30,
            max_jitter_secs: 120,
            calendar_months: vec![4, 5],
            calendar_year: 2014,
            currency: "USD".to_string(),
        }
    }
}

/// Upstream endpoints and request shaping
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EndpointConfig {
    /// Paginated JSON search endpoint
    pub search_url: String,

    /// Prefix of the referer sent with search requests; the zip code is appended
    pub search_referer: String,

    /// Calendar widget endpoint; the listing id is appended as a path segment
    pub calendar_url: String,

    pub user_agent: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            search_url: "https://m.airbnb.com/api/-/v1/listings/search".to_string(),
            search_referer: "https://m.airbnb.com/s/".to_string(),
            calendar_url: "https://www.airbnb.com/rooms/calendar_tab_inner2/".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the JSON dataset written at crawl completion
    pub listings_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            listings_path: "listings.json".to_string(),
        }
    }
}
