//! Output module for persisting harvested listings
//!
//! This module handles:
//! - Writing the final dataset as a JSON array
//! - Summarizing the dataset for the crawl log

mod json;
mod traits;

pub use json::JsonOutputHandler;
pub use traits::{DatasetSummary, OutputError, OutputHandler, OutputResult};
