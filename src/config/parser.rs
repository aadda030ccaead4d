use crate::config::types::{BrowserSettings, ConfigFile, CrawlConfig, CrawlSettings};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The file holds a single `[crawl]` table with kebab-case keys. Every key is
/// optional; the returned settings are validated only once they have been
/// merged with command-line overrides and resolved (see [`resolve`]).
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use docs_crawler::config::load_config;
///
/// let settings = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Base URL: {:?}", settings.base_url);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlSettings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&content)?;
    Ok(file.crawl)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run can be tied back to the exact file it used.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration file and returns both the settings and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(CrawlSettings, String), ConfigError> {
    let settings = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((settings, hash))
}

/// Fills unset fields with defaults and validates the result
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - A complete, valid configuration
/// * `Err(ConfigError)` - The base URL is missing or a value is out of range
pub fn resolve(settings: CrawlSettings) -> Result<CrawlConfig, ConfigError> {
    let base_url = settings
        .base_url
        .ok_or_else(|| ConfigError::Validation("base-url is required".to_string()))?;

    let mut config = match settings.output_dir {
        Some(dir) => CrawlConfig::new(base_url, dir),
        None => CrawlConfig::new(base_url, crate::config::DEFAULT_OUTPUT_DIR),
    };

    let browser_defaults = BrowserSettings::default();

    config.max_pages = settings.max_pages.unwrap_or(config.max_pages);
    config.wait_seconds = settings.wait.unwrap_or(config.wait_seconds);
    config.engine = settings.engine.unwrap_or(config.engine);
    config.concurrency = settings.concurrency.unwrap_or(config.concurrency);
    config.request_timeout_secs = settings
        .request_timeout
        .unwrap_or(config.request_timeout_secs);
    config.navigation_timeout_secs = settings
        .navigation_timeout
        .unwrap_or(config.navigation_timeout_secs);
    config.idle_timeout_secs = settings.idle_timeout.unwrap_or(config.idle_timeout_secs);
    config.delay_ms = settings.delay_ms.unwrap_or(config.delay_ms);
    config.max_duration_secs = settings.max_duration;
    if let Some(user_agent) = settings.user_agent {
        config.user_agent = user_agent;
    }
    config.browser = BrowserSettings {
        viewport_width: settings
            .viewport_width
            .unwrap_or(browser_defaults.viewport_width),
        viewport_height: settings
            .viewport_height
            .unwrap_or(browser_defaults.viewport_height),
        chrome_executable: settings.chrome_executable,
        headless: settings.headless.unwrap_or(browser_defaults.headless),
    };

    validate(&config)?;

    Ok(config)
}
