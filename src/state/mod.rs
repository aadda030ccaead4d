//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FrontierState`: the BFS queue plus the queued/visited dedup sets
//! - `PageOutcome`: the terminal result of processing a single page

mod frontier;
mod page_outcome;

// Re-export main types
pub use frontier::FrontierState;
pub use page_outcome::PageOutcome;
