use crate::config::types::{Config, CrawlerConfig, EndpointConfig, OutputConfig};
use crate::ConfigError;
use chrono::NaiveDate;
use url::Url;

/// Longest accepted value for either request delay setting, in seconds
const MAX_DELAY_SECS: u64 = 24 * 60 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_endpoint_config(&config.endpoints)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.guests < 1 {
        return Err(ConfigError::Validation(format!(
            "guests must be >= 1, got {}",
            config.guests
        )));
    }

    if config.min_delay_secs > MAX_DELAY_SECS {
        return Err(ConfigError::Validation(format!(
            "min_delay_secs must be <= {}, got {}",
            MAX_DELAY_SECS, config.min_delay_secs
        )));
    }

    if config.max_jitter_secs > MAX_DELAY_SECS {
        return Err(ConfigError::Validation(format!(
            "max_jitter_secs must be <= {}, got {}",
            MAX_DELAY_SECS, config.max_jitter_secs
        )));
    }

    if config.calendar_months.is_empty() {
        return Err(ConfigError::Validation(
            "calendar_months must name at least one month".to_string(),
        ));
    }

    for (i, month) in config.calendar_months.iter().enumerate() {
        if NaiveDate::from_ymd_opt(config.calendar_year, *month, 1).is_none() {
            return Err(ConfigError::Validation(format!(
                "calendar month {}/{} is not a valid month",
                month, config.calendar_year
            )));
        }

        // Months overlap in date space only if they repeat
        if config.calendar_months[..i].contains(month) {
            return Err(ConfigError::Validation(format!(
                "calendar month {} is listed twice",
                month
            )));
        }
    }

    if config.currency.is_empty() {
        return Err(ConfigError::Validation(
            "currency cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates endpoint configuration
fn validate_endpoint_config(config: &EndpointConfig) -> Result<(), ConfigError> {
    validate_http_url("search_url", &config.search_url)?;
    validate_http_url("search_referer", &config.search_referer)?;
    validate_http_url("calendar_url", &config.calendar_url)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.listings_path.is_empty() {
        return Err(ConfigError::Validation(
            "listings_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    Ok(())
}
