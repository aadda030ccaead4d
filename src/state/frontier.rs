//! Frontier state for a single crawl run
//!
//! Owns the breadth-first queue of targets awaiting fetch and the sets used to
//! guarantee each normalized URL is fetched at most once per run.

use crate::url::CrawlTarget;
use std::collections::{HashSet, VecDeque};

/// The crawl frontier
///
/// # Invariants
///
/// - `queued ⊇ pending ∪ in_flight ∪ visited`
/// - once dequeued, a target is in exactly one of `in_flight` or `visited`
/// - `pending` is strict FIFO and [`offer`](Self::offer) only appends, so
///   targets are handed out in breadth-first order from the seed
///
/// A fresh `FrontierState` is created per crawl and discarded afterwards; it
/// is never shared between runs.
#[derive(Debug, Clone)]
pub struct FrontierState {
    pending: VecDeque<CrawlTarget>,
    queued: HashSet<CrawlTarget>,
    in_flight: HashSet<CrawlTarget>,
    visited: HashSet<CrawlTarget>,
}

impl FrontierState {
    /// Creates a frontier seeded with a single target
    pub fn new(seed: CrawlTarget) -> Self {
        let mut frontier = Self {
            pending: VecDeque::new(),
            queued: HashSet::new(),
            in_flight: HashSet::new(),
            visited: HashSet::new(),
        };
        frontier.initialize(seed);
        frontier
    }

    /// Resets the frontier to `pending = {seed}`, `queued = {seed}`
    pub fn initialize(&mut self, seed: CrawlTarget) {
        self.pending.clear();
        self.queued.clear();
        self.in_flight.clear();
        self.visited.clear();

        self.queued.insert(seed.clone());
        self.pending.push_back(seed);
    }

    /// Removes up to `max_size` targets from the front of the queue
    ///
    /// Targets already visited are skipped without counting toward `max_size`.
    /// Returned targets are in flight until passed to
    /// [`mark_visited`](Self::mark_visited).
    pub fn next_batch(&mut self, max_size: usize) -> Vec<CrawlTarget> {
        let mut batch = Vec::with_capacity(max_size.min(self.pending.len()));

        while batch.len() < max_size {
            let Some(target) = self.pending.pop_front() else {
                break;
            };

            if self.visited.contains(&target) || self.in_flight.contains(&target) {
                continue;
            }

            self.in_flight.insert(target.clone());
            batch.push(target);
        }

        batch
    }

    /// Records that a dequeued target's fetch has completed
    ///
    /// Success and terminal failure are both "visited": the target is never
    /// fetched again in this run.
    ///
    /// # Returns
    ///
    /// `false` (and no change) if the target was not handed out by
    /// [`next_batch`](Self::next_batch)
    pub fn mark_visited(&mut self, target: &CrawlTarget) -> bool {
        if !self.in_flight.remove(target) {
            return false;
        }
        self.visited.insert(target.clone());
        true
    }

    /// Enqueues a target unless it has been seen before
    ///
    /// This is the single dedup choke-point: every discovered link passes
    /// through here before it can be fetched.
    ///
    /// # Returns
    ///
    /// `true` if the target was appended to the queue
    pub fn offer(&mut self, target: CrawlTarget) -> bool {
        if self.is_known(&target) {
            return false;
        }
        self.queued.insert(target.clone());
        self.pending.push_back(target);
        true
    }

    /// Normalizes and enqueues a raw URL
    ///
    /// Malformed URLs are treated as out of scope and silently dropped.
    pub fn offer_url(&mut self, url: &str) -> bool {
        match CrawlTarget::parse(url) {
            Ok(target) => self.offer(target),
            Err(e) => {
                tracing::debug!("Dropping malformed URL {}: {}", url, e);
                false
            }
        }
    }

    /// Returns true if the target has been queued or visited
    pub fn is_known(&self, target: &CrawlTarget) -> bool {
        self.queued.contains(target) || self.visited.contains(target)
    }

    /// Returns true if the target's fetch has completed
    pub fn is_visited(&self, target: &CrawlTarget) -> bool {
        self.visited.contains(target)
    }

    /// Returns true when nothing is waiting to be fetched
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns true when `visited` has reached `limit`
    pub fn budget_reached(&self, limit: usize) -> bool {
        self.visited.len() >= limit
    }

    /// Number of targets waiting to be fetched
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of targets ever enqueued
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Number of completed fetches
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Visited targets, sorted by URL
    pub fn visited_sorted(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.visited.iter().map(|t| t.to_string()).collect();
        urls.sort();
        urls
    }
}
