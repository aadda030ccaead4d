//! Per-page crawl outcomes
//!
//! Every dequeued target ends in exactly one outcome. Failures are values, not
//! early returns, so the driver can record them and keep going.

use crate::PageError;
use std::fmt;
use std::path::PathBuf;

/// The terminal result of processing one page
#[derive(Debug)]
pub enum PageOutcome {
    /// Page was fetched and written to disk
    Saved {
        /// Where the page content was written
        path: PathBuf,
        /// Number of new targets the page contributed to the frontier
        new_links: usize,
    },

    /// Page could not be fetched (timeout, HTTP error, navigation error, ...)
    FetchFailed(PageError),

    /// Page was fetched but could not be written
    SaveFailed(PageError),
}

impl PageOutcome {
    /// Returns true if the page content was captured
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// Returns the error for failed outcomes
    pub fn error(&self) -> Option<&PageError> {
        match self {
            Self::Saved { .. } => None,
            Self::FetchFailed(e) | Self::SaveFailed(e) => Some(e),
        }
    }

    /// Short label used in logs and the run summary
    pub fn label(&self) -> &'static str {
        match self {
            Self::Saved { .. } => "saved",
            Self::FetchFailed(_) => "fetch_failed",
            Self::SaveFailed(_) => "save_failed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved { path, .. } => write!(f, "saved to {}", path.display()),
            Self::FetchFailed(e) | Self::SaveFailed(e) => write!(f, "{}: {}", self.label(), e),
        }
    }
}
