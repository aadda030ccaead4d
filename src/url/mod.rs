//! URL handling module for Docs-Crawler
//!
//! This module provides URL normalization into [`CrawlTarget`]s, authority
//! extraction, and the [`ScopeFilter`] that decides which discovered links
//! belong to the crawl.

mod domain;
mod normalize;
mod scope;

// Re-export main types and functions
pub use domain::extract_authority;
pub use normalize::{strip_fragment, CrawlTarget};
pub use scope::{Rejection, ScopeContext, ScopeFilter};
