//! Configuration module for Rental-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; omitted keys keep the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use rental_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Page size: {}", config.crawler.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, EndpointConfig, OutputConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
