//! URL handling module for Rental-Harvest
//!
//! All upstream URLs are derived from the configured endpoint bases here, so
//! the crawler never formats URLs by hand.

mod endpoints;

pub use endpoints::{calendar_url, search_referer, search_url};
