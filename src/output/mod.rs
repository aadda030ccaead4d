//! Output module for persisting crawl results
//!
//! This module handles:
//! - Saving fetched pages under a directory mirroring the URL hierarchy
//! - Accumulating the run summary
//! - Writing the summary file and printing the end-of-run report

mod report;
mod sink;
mod summary;

pub use report::{print_summary, render_summary};
pub use sink::{PageSink, INDEX_FILE_NAME, SUMMARY_FILE_NAME};
pub use summary::{CrawlSummary, FailedPage, OutputError, OutputResult, StopReason};
