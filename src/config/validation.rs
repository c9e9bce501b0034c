use crate::config::types::{Config, HttpConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the concurrency cap
const MAX_CONCURRENT_LIMIT: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_start_url(&config.start_url)?;
    validate_concurrency(config.max_concurrent)?;
    validate_http_config(&config.http)?;

    if config.summary_sentences < 1 {
        return Err(ConfigError::Validation(
            "summary_sentences must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// The start URL must be absolute http(s) with a host
fn validate_start_url(start_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' must use http or https",
            start_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' has no host",
            start_url
        )));
    }

    Ok(())
}

fn validate_concurrency(max_concurrent: usize) -> Result<(), ConfigError> {
    if !(1..=MAX_CONCURRENT_LIMIT).contains(&max_concurrent) {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be between 1 and {}, got {}",
            MAX_CONCURRENT_LIMIT, max_concurrent
        )));
    }
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "http.user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "http timeouts must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
