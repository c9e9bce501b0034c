//! Crawl frontier: pending queue and visited set
//!
//! The frontier has a single owner, the scheduler, which mutates it only
//! between fetch completions. Concurrent work items never touch it; they
//! return the links they found and the scheduler offers them here. That keeps
//! `offer` and `take_batch` atomic without locks.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be fetched, with its distance from the start URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// Pending queue plus visited set for one crawl run
///
/// Invariants:
/// - a URL in the visited set is never enqueued again
/// - no entry deeper than `max_depth` is ever enqueued through `offer`
/// - entries leave the queue in the order they entered it
#[derive(Debug)]
pub struct Frontier {
    pending: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    max_depth: u32,
    resumed: usize,
}

impl Frontier {
    /// Creates an empty frontier bounded at `max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            pending: VecDeque::new(),
            visited: HashSet::new(),
            max_depth,
            resumed: 0,
        }
    }

    /// Queues the start URL at depth 0
    ///
    /// Nothing is marked visited. The start URL is queued even when a resumed
    /// artifact already lists it, so a resumed run re-reads the root page and
    /// continues from whatever it links to that is not yet visited.
    pub fn seed(&mut self, start_url: Url) {
        self.pending.push_back(FrontierEntry {
            url: start_url,
            depth: 0,
        });
    }

    /// Marks previously saved URLs as visited without queueing them
    pub fn load_existing<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for url in urls {
            if self.visited.insert(url.into()) {
                self.resumed += 1;
            }
        }
    }

    /// Queues `url` at `depth` unless it was already seen or is too deep
    ///
    /// Returns true if the URL was queued.
    pub fn offer(&mut self, url: Url, depth: u32) -> bool {
        if depth > self.max_depth || self.visited.contains(url.as_str()) {
            return false;
        }

        self.visited.insert(url.to_string());
        self.pending.push_back(FrontierEntry { url, depth });
        true
    }

    /// Removes and returns up to `n` entries in FIFO order
    ///
    /// Every returned URL is marked visited, since it is about to be dispatched.
    pub fn take_batch(&mut self, n: usize) -> Vec<FrontierEntry> {
        let count = n.min(self.pending.len());
        let batch: Vec<FrontierEntry> = self.pending.drain(..count).collect();

        for entry in &batch {
            self.visited.insert(entry.url.to_string());
        }

        batch
    }

    /// Returns true if the URL has been queued, dispatched, or loaded
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of entries waiting to be dispatched
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is waiting to be dispatched
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Marks a URL visited without queueing it
    ///
    /// Used for redirect targets. Returns false if the URL was already
    /// queued, dispatched, or loaded.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Number of URLs loaded from a previous run
    pub fn resumed_len(&self) -> usize {
        self.resumed
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
