//! Crawler module for page fetching and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - The [`PageFetcher`] capability and its two variants (static HTTP and
//!   rendered headless Chromium)
//! - HTML parsing and link extraction
//! - The crawl driver ([`Coordinator`])

mod coordinator;
mod fetcher;
mod parser;
mod rendered;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, StaticFetcher};
pub use parser::{parse_html, ParsedPage};
pub use rendered::RenderedFetcher;

use crate::config::{CrawlConfig, Engine};
use crate::output::CrawlSummary;
use crate::url::CrawlTarget;
use crate::{CrawlError, PageError};
use async_trait::async_trait;
use std::future::Future;
use tokio::sync::watch;

/// Exit status used when a second interrupt aborts the run
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// The result of fetching one page
///
/// Transient: consumed immediately by the scope filter and the page sink.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The target that was requested
    pub target: CrawlTarget,

    /// Final URL after redirects
    pub final_url: String,

    /// Raw (or rendered) HTML
    pub content: String,

    /// Absolute link targets found in the page, in document order, unfiltered
    pub links: Vec<String>,
}

/// A strategy for retrieving a page
///
/// Selected once at construction time from [`Engine`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Fetches one page
    ///
    /// Every failure is a [`PageError`] for this page only.
    async fn fetch(&self, target: &CrawlTarget) -> Result<FetchResult, PageError>;

    /// Releases shared resources once the crawl loop has exited
    async fn shutdown(&self) -> Result<(), PageError> {
        Ok(())
    }
}

/// Builds the fetcher for the configured engine
///
/// For [`Engine::Rendered`] this launches the browser, so it fails with
/// [`CrawlError::BrowserLaunch`] when Chromium is unavailable.
pub async fn build_fetcher(config: &CrawlConfig) -> Result<Box<dyn PageFetcher>, CrawlError> {
    let fetcher: Box<dyn PageFetcher> = match config.engine {
        Engine::Static => Box::new(StaticFetcher::new(config)?),
        Engine::Rendered => Box::new(RenderedFetcher::launch(config).await?),
    };
    tracing::info!("Using {} fetcher", fetcher.name());
    Ok(fetcher)
}

/// Relays interrupts into the cancellation channel
///
/// The first interrupt asks the crawl to stop after the current batch. A
/// second one returns `true`, meaning the caller should abort immediately.
/// Returns `false` once the interrupt source fails.
async fn relay_interrupts<F, Fut>(mut interrupt: F, cancel: watch::Sender<bool>) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupt().await.is_err() {
        return false;
    }
    tracing::warn!(
        "Interrupt received, stopping after the current batch (press Ctrl-C again to exit now)"
    );
    let _ = cancel.send(true);

    interrupt().await.is_ok()
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and prepare the output directory
/// 2. Build the fetcher for the configured engine
/// 3. Install a Ctrl-C handler: the first press stops the crawl after the
///    current batch, a second press exits the process with status 130
/// 4. Run the crawl loop and write the summary
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The crawl ran to completion (any stop reason)
/// * `Err(CrawlError)` - The crawl could not start
pub async fn crawl(config: CrawlConfig) -> Result<CrawlSummary, CrawlError> {
    let coordinator = Coordinator::new(config)?;
    let fetcher = build_fetcher(coordinator.config()).await?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let signal_task = tokio::spawn(async move {
        if relay_interrupts(tokio::signal::ctrl_c, cancel_tx).await {
            tracing::error!("Second interrupt received, exiting without a summary");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    let result = coordinator
        .with_cancellation(cancel_rx)
        .run(fetcher.as_ref())
        .await;

    signal_task.abort();
    result
}
