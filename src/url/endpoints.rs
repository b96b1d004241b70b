//! Endpoint URL construction
//!
//! Builds the search, referer, and calendar URLs from the configured bases.
//! Path segments and query values are percent-encoded by `url`.

use crate::config::{CrawlerConfig, EndpointConfig};
use crate::listing::ListingId;
use crate::{UrlError, UrlResult};
use url::Url;

/// Builds the search-page URL for one offset
///
/// # Example
///
/// ```
/// use rental_harvest::config::Config;
/// use rental_harvest::url::search_url;
///
/// let config = Config::default();
/// let url = search_url(&config.endpoints, &config.crawler, "10001", 40).unwrap();
/// assert_eq!(url.query(), Some("location=10001&number_of_guests=1&offset=40&guests=1&items_per_page=20"));
/// ```
pub fn search_url(
    endpoints: &EndpointConfig,
    crawler: &CrawlerConfig,
    zip_code: &str,
    offset: u64,
) -> UrlResult<Url> {
    let mut url = Url::parse(&endpoints.search_url)?;
    url.query_pairs_mut()
        .append_pair("location", zip_code)
        .append_pair("number_of_guests", &crawler.guests.to_string())
        .append_pair("offset", &offset.to_string())
        .append_pair("guests", &crawler.guests.to_string())
        .append_pair("items_per_page", &crawler.page_size.to_string());
    Ok(url)
}

/// Builds the referer sent with search-page requests
pub fn search_referer(endpoints: &EndpointConfig, zip_code: &str) -> UrlResult<Url> {
    push_segment(&endpoints.search_referer, zip_code)
}

/// Builds the calendar widget URL for one listing and month
pub fn calendar_url(
    endpoints: &EndpointConfig,
    crawler: &CrawlerConfig,
    id: &ListingId,
    month: u32,
) -> UrlResult<Url> {
    let mut url = push_segment(&endpoints.calendar_url, &id.to_string())?;
    url.query_pairs_mut()
        .append_pair("cal_month", &month.to_string())
        .append_pair("cal_year", &crawler.calendar_year.to_string())
        .append_pair("currency", &crawler.currency);
    Ok(url)
}

/// Appends one path segment to a base URL, ignoring a trailing slash on the base
fn push_segment(base: &str, segment: &str) -> UrlResult<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| UrlError::CannotBeBase(base.to_string()))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}
