//! Docs-Crawler: a scoped documentation-site crawler
//!
//! This crate discovers and retrieves every page of a documentation website by
//! following hyperlinks breadth-first from a base URL, staying on the same host
//! and under the base path prefix. Pages are fetched either with a plain HTTP
//! request or through a headless Chromium (for client-rendered sites), saved
//! under an output directory that mirrors the URL path hierarchy, and a JSON
//! run summary is written when the crawl ends.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Fatal crawl errors
///
/// These only occur while a crawl is starting up. Once the seed page has been
/// captured, every failure is contained at the page level (see [`PageError`]).
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Output directory {path} is not writable: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Base URL could not be fetched: {0}")]
    SeedUnreachable(#[source] PageError),

    #[error("Failed to write crawl summary: {0}")]
    Summary(#[from] output::OutputError),
}

/// Per-page errors
///
/// A page error is recorded against the page that caused it and the crawl
/// moves on to the next target.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Timed out after {seconds}s fetching {url}")]
    Timeout { url: String, seconds: u64 },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Not an HTML page: {url} ({content_type})")]
    NotHtml { url: String, content_type: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for single-page operations
pub type PageResult<T> = std::result::Result<T, PageError>;

// Re-export commonly used types
pub use config::{CrawlConfig, Engine};
pub use crawler::{crawl, Coordinator, FetchResult, PageFetcher};
pub use output::{CrawlSummary, PageSink};
pub use state::{FrontierState, PageOutcome};
pub use url::{CrawlTarget, ScopeFilter};
