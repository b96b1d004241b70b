//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: pagination cursor, expected total, crawled-id set, and the
//!   accumulated listings of one crawl

mod crawl_state;

pub use crawl_state::CrawlState;
