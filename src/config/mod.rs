//! Configuration module for Docs-Crawler
//!
//! Settings come from three layers, later layers winning: built-in defaults, an
//! optional TOML file (`[crawl]` table) and command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use docs_crawler::config::{load_config, resolve, CrawlSettings};
//! use std::path::Path;
//!
//! let file = load_config(Path::new("crawl.toml")).unwrap();
//! let cli = CrawlSettings { max_pages: Some(10), ..Default::default() };
//! let config = resolve(file.merge(cli)).unwrap();
//! println!("Crawling {} with budget {}", config.base_url, config.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserSettings, ConfigFile, CrawlConfig, CrawlSettings, Engine, DEFAULT_MAX_PAGES,
    DEFAULT_OUTPUT_DIR, DEFAULT_USER_AGENT, DEFAULT_WAIT_SECONDS, MAX_CONCURRENCY,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, resolve};
pub use validation::validate;
