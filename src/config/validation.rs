use crate::config::types::{CrawlConfig, MAX_CONCURRENCY};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;
    validate_limits(config)?;
    validate_timing(config)?;
    validate_identity(config)?;
    Ok(())
}

/// Validates the base URL: absolute, http(s), with a host
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' must use http or https",
            base_url
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' has no host",
            base_url
        )));
    }

    Ok(())
}

/// Validates page budget and concurrency
fn validate_limits(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates timeouts and delays
fn validate_timing(config: &CrawlConfig) -> Result<(), ConfigError> {
    if !config.wait_seconds.is_finite() || config.wait_seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "wait must be a non-negative number of seconds, got {}",
            config.wait_seconds
        )));
    }

    for (name, value) in [
        ("request-timeout", config.request_timeout_secs),
        ("navigation-timeout", config.navigation_timeout_secs),
        ("idle-timeout", config.idle_timeout_secs),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be >= 1s", name)));
        }
    }

    if config.max_duration_secs == Some(0) {
        return Err(ConfigError::Validation(
            "max-duration must be >= 1s when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent and browser viewport
fn validate_identity(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.browser.viewport_width == 0 || config.browser.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport must be non-zero, got {}x{}",
            config.browser.viewport_width, config.browser.viewport_height
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> CrawlConfig {
        CrawlConfig::new("https://x.io/docs", "./out")
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://x.io/docs").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080/").is_ok());

        assert!(validate_base_url("").is_err());
        assert!(validate_base_url("x.io/docs").is_err());
        assert!(validate_base_url("ftp://x.io/docs").is_err());
        assert!(validate_base_url("file:///tmp/docs").is_err());
    }

    #[test]
    fn test_validate_limits() {
        let mut config = valid_config();
        config.max_pages = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.concurrency = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.concurrency = MAX_CONCURRENCY + 1;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.concurrency = MAX_CONCURRENCY;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_timing() {
        let mut config = valid_config();
        config.wait_seconds = -1.0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.wait_seconds = f64::NAN;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.navigation_timeout_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.max_duration_secs = Some(0);
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.wait_seconds = 0.0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_identity() {
        let mut config = valid_config();
        config.user_agent = "   ".to_string();
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.browser.viewport_height = 0;
        assert!(validate(&config).is_err());
    }
}
