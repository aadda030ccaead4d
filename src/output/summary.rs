//! Run summary types
//!
//! The summary is created when a crawl starts, updated once per page, and
//! written exactly once when the crawl loop exits.

use crate::config::{CrawlConfig, Engine};
use crate::state::PageOutcome;
use crate::url::CrawlTarget;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Crawl summary has already been written")]
    AlreadyFinalized,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The frontier ran empty
    Exhausted,
    /// The page budget was reached
    BudgetReached,
    /// The wall-clock budget was reached
    TimeLimit,
    /// The operator interrupted the crawl
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exhausted => "frontier exhausted",
            Self::BudgetReached => "page budget reached",
            Self::TimeLimit => "time limit reached",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A page that was attempted but not captured
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPage {
    pub url: String,
    pub error: String,
}

/// Summary of a crawl run, serialized to `crawl_summary.json`
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub base_url: String,
    pub output_directory: String,
    /// Number of pages visited (captured or attempted)
    pub pages_downloaded: usize,
    /// ISO-8601 timestamp of when the summary was finalized
    pub crawl_date: String,
    pub elapsed_time_seconds: f64,
    pub visited_urls: Vec<String>,

    /// ISO-8601 timestamp of when the crawl started
    pub started_at: String,
    pub max_pages: usize,
    pub engine: Engine,
    pub pages_saved: usize,
    pub pages_failed: usize,
    pub failed_urls: Vec<FailedPage>,
    pub stop_reason: Option<StopReason>,

    #[serde(skip)]
    started: Instant,
}

impl CrawlSummary {
    /// Starts a summary for a crawl with the given configuration
    pub fn start(config: &CrawlConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            output_directory: config.output_dir.display().to_string(),
            pages_downloaded: 0,
            crawl_date: String::new(),
            elapsed_time_seconds: 0.0,
            visited_urls: Vec::new(),
            started_at: now_iso8601(),
            max_pages: config.max_pages,
            engine: config.engine,
            pages_saved: 0,
            pages_failed: 0,
            failed_urls: Vec::new(),
            stop_reason: None,
            started: Instant::now(),
        }
    }

    /// Records the outcome of one page
    pub fn record(&mut self, target: &CrawlTarget, outcome: &PageOutcome) {
        match outcome.error() {
            None => self.pages_saved += 1,
            Some(e) => {
                self.pages_failed += 1;
                self.failed_urls.push(FailedPage {
                    url: target.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    /// Closes the summary with the final visited set and stop reason
    ///
    /// `visited_urls` must be the frontier's visited set; the page count is
    /// derived from it.
    pub fn finish(&mut self, visited_urls: Vec<String>, reason: StopReason) {
        let mut visited_urls = visited_urls;
        visited_urls.sort();

        self.failed_urls.sort_by(|a, b| a.url.cmp(&b.url));
        self.pages_downloaded = visited_urls.len();
        self.visited_urls = visited_urls;
        self.crawl_date = now_iso8601();
        self.elapsed_time_seconds = self.started.elapsed().as_secs_f64();
        self.stop_reason = Some(reason);
    }

    /// Percentage of visited pages that were captured
    pub fn success_rate(&self) -> f64 {
        if self.pages_downloaded == 0 {
            return 0.0;
        }
        (self.pages_saved as f64 / self.pages_downloaded as f64) * 100.0
    }
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
