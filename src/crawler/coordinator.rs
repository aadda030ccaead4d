//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl driver loop that coordinates:
//! - Pulling batches from the frontier in breadth-first order
//! - Fetching each batch through the configured [`PageFetcher`]
//! - Screening discovered links and merging them into the frontier
//! - Persisting pages and recording per-page outcomes
//! - Stopping on budget, exhaustion, time limit or interrupt, then writing the
//!   run summary

use crate::config::{validate, CrawlConfig};
use crate::crawler::{FetchResult, PageFetcher};
use crate::output::{CrawlSummary, PageSink, StopReason};
use crate::state::{FrontierState, PageOutcome};
use crate::url::{CrawlTarget, ScopeContext, ScopeFilter};
use crate::{CrawlError, PageError, UrlError};
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tokio::sync::watch;
use url::Url;

/// Main crawl driver
///
/// Owns all mutable crawl state. Fetches within a batch run concurrently, but
/// every frontier mutation happens here, serially, in dequeue order.
pub struct Coordinator {
    config: CrawlConfig,
    scope: ScopeFilter,
    sink: PageSink,
    frontier: FrontierState,
    summary: CrawlSummary,
    seed: CrawlTarget,
    cancel: Option<watch::Receiver<bool>>,
}

impl Coordinator {
    /// Creates a coordinator for one crawl run
    ///
    /// Validates the configuration and opens the output directory. Any error
    /// here is a startup failure.
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        validate(&config)?;

        let base_url =
            Url::parse(&config.base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
        let seed = CrawlTarget::from_url(base_url.clone())?;
        let scope = ScopeFilter::new(&base_url)?;
        let sink = PageSink::new(&config.output_dir)?;

        tracing::debug!("Scope prefix: {}", scope.prefix());

        Ok(Self {
            frontier: FrontierState::new(seed.clone()),
            summary: CrawlSummary::start(&config),
            config,
            scope,
            sink,
            seed,
            cancel: None,
        })
    }

    /// Stops the crawl after the current batch once `cancel` turns true
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Runs the crawl loop to completion
    ///
    /// The fetcher is shut down however the loop exits. The summary is
    /// written for every completed run, but not when the seed page cannot be
    /// fetched.
    pub async fn run(mut self, fetcher: &dyn PageFetcher) -> Result<CrawlSummary, CrawlError> {
        tracing::info!(
            "Starting crawl of {} (max {} pages, {} engine, concurrency {})",
            self.seed,
            self.config.max_pages,
            self.config.engine,
            self.config.concurrency
        );

        let stopped = self.drive(fetcher).await;

        if let Err(e) = fetcher.shutdown().await {
            tracing::warn!("Failed to shut down {} fetcher: {}", fetcher.name(), e);
        }

        let reason = stopped?;
        tracing::info!(
            "Crawl finished ({}): {} pages visited, {} saved, {} failed",
            reason,
            self.frontier.visited_len(),
            self.summary.pages_saved,
            self.summary.pages_failed
        );

        self.summary.finish(self.frontier.visited_sorted(), reason);
        self.sink.finalize(&self.summary)?;

        Ok(self.summary)
    }

    /// The crawl loop proper
    async fn drive(&mut self, fetcher: &dyn PageFetcher) -> Result<StopReason, CrawlError> {
        let started = Instant::now();
        let deadline = self.config.max_duration().map(|limit| started + limit);

        // The seed goes first and alone; if it cannot be fetched the crawl
        // has nothing to work from.
        let seed_batch = self.frontier.next_batch(1);
        for target in seed_batch {
            self.log_visit(&target, 0);
            match fetcher.fetch(&target).await {
                Ok(page) => self.complete(target, Ok(page)),
                Err(e) => {
                    tracing::error!("Base URL {} could not be fetched: {}", target, e);
                    return Err(CrawlError::SeedUnreachable(e));
                }
            }
        }

        loop {
            if let Some(reason) = self.stop_reason(deadline) {
                return Ok(reason);
            }

            let remaining = self.config.max_pages - self.frontier.visited_len();
            let batch = self.frontier.next_batch(self.config.concurrency.min(remaining));
            if batch.is_empty() {
                return Ok(StopReason::Exhausted);
            }

            for (offset, target) in batch.iter().enumerate() {
                self.log_visit(target, offset);
            }

            let width = batch.len();
            let results: Vec<(CrawlTarget, Result<FetchResult, PageError>)> = stream::iter(batch)
                .map(|target| async move {
                    let result = fetcher.fetch(&target).await;
                    (target, result)
                })
                .buffered(width)
                .collect()
                .await;

            for (target, result) in results {
                self.complete(target, result);
            }

            let delay = self.config.inter_batch_delay();
            if !delay.is_zero() && !self.frontier.is_exhausted() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Checks the stop conditions, in priority order
    fn stop_reason(&self, deadline: Option<Instant>) -> Option<StopReason> {
        if self.frontier.budget_reached(self.config.max_pages) {
            return Some(StopReason::BudgetReached);
        }
        if self.frontier.is_exhausted() {
            return Some(StopReason::Exhausted);
        }
        if self.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(StopReason::TimeLimit);
        }
        None
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    fn log_visit(&self, target: &CrawlTarget, offset: usize) {
        tracing::info!(
            "Visiting {} ({}/{})",
            target,
            self.frontier.visited_len() + offset + 1,
            self.config.max_pages
        );
    }

    /// Turns a fetch result into the page's outcome and records it
    fn complete(&mut self, target: CrawlTarget, result: Result<FetchResult, PageError>) {
        self.frontier.mark_visited(&target);

        let outcome = match result {
            Err(e) => PageOutcome::FetchFailed(e),
            Ok(page) => {
                // Links are merged even if the save below fails
                let new_links = self.merge_links(&target, &page.links);
                match self.sink.save(&target, &page.content) {
                    Ok(path) => PageOutcome::Saved { path, new_links },
                    Err(e) => PageOutcome::SaveFailed(e),
                }
            }
        };

        match &outcome {
            PageOutcome::Saved { new_links, .. } => tracing::debug!(
                "{}: {} ({} new links, {} pending)",
                target,
                outcome,
                new_links,
                self.frontier.pending_len()
            ),
            _ => tracing::warn!("{}", outcome),
        }

        self.summary.record(&target, &outcome);
    }

    /// Screens discovered links and offers accepted ones to the frontier
    ///
    /// Returns the number of targets added.
    fn merge_links(&mut self, current: &CrawlTarget, links: &[String]) -> usize {
        let mut added = 0;

        for link in links {
            let ctx = ScopeContext {
                current,
                frontier: &self.frontier,
            };
            match self.scope.screen(link, &ctx) {
                Ok(target) => {
                    if self.frontier.offer(target) {
                        added += 1;
                    }
                }
                Err(rejection) => tracing::debug!("Skipping {}: {:?}", link, rejection),
            }
        }

        added
    }
}
