//! Batch scheduler driving the breadth-first traversal
//!
//! Each round the scheduler draws up to `max_concurrent` entries from the
//! frontier, fetches them concurrently on the current task, and folds every
//! result back in as it completes: discovered links are offered to the
//! frontier and the page outcome goes to the sink. The next batch is drawn
//! only when the whole batch has finished, which bounds in-flight fetches and
//! keeps depth-d pages ahead of depth-(d+1) pages.
//!
//! Work items never touch the frontier. Mutation happens only in the fold,
//! between polls, so no fetch is ever suspended halfway through an update.

use crate::crawler::content::extract_content;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::links::extract_links;
use crate::crawler::CrawlMode;
use crate::output::{CrawlStats, PageOutcome, Sink};
use crate::url::{canonicalize_url, Scope};
use crate::TrawlError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Result of one work item, handed back to the scheduler
#[derive(Debug)]
struct Visit {
    outcome: PageOutcome,
    links: Vec<Url>,
    /// Canonical final URL when the fetch was redirected elsewhere
    redirected_to: Option<Url>,
}

/// Drives one crawl run over a frontier
///
/// The scheduler owns the frontier for the length of the run. It is generic
/// over the fetcher so tests can run whole crawls against canned pages.
pub struct Scheduler<F> {
    fetcher: F,
    frontier: Frontier,
    scope: Option<Scope>,
    mode: CrawlMode,
    max_concurrent: usize,
    cancel: CancellationToken,
}

impl<F: Fetcher> Scheduler<F> {
    /// Creates a scheduler over a seeded (and optionally pre-loaded) frontier
    ///
    /// Without a scope no links are followed, which is what replay mode wants.
    pub fn new(fetcher: F, frontier: Frontier, mode: CrawlMode, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            frontier,
            scope: None,
            mode,
            max_concurrent: max_concurrent.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Follows links that fall inside `scope`
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Stops drawing new batches once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Runs batches until the frontier is empty or cancellation is requested
    ///
    /// Per-URL failures are logged and recorded, never returned. Sink write
    /// failures during the run are logged and counted; only a failure of the
    /// final `finish` call aborts with an error.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - Counters for the run
    /// * `Err(TrawlError)` - The sink could not be finalized
    pub async fn run<S: Sink>(&mut self, sink: &mut S) -> Result<CrawlStats, TrawlError> {
        let started = Instant::now();
        let mut stats = CrawlStats::new(self.mode);
        stats.resumed = self.frontier.resumed_len() as u64;

        tracing::info!(
            "Starting {} run: {} pending, {} carried over, max depth {}, batch size {}",
            self.mode,
            self.frontier.pending_len(),
            stats.resumed,
            self.frontier.max_depth(),
            self.max_concurrent
        );

        while !self.frontier.is_empty() {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    "Cancellation requested; stopping with {} URLs still pending",
                    self.frontier.pending_len()
                );
                stats.cancelled = true;
                break;
            }

            let batch = self.frontier.take_batch(self.max_concurrent);
            stats.batches += 1;
            tracing::debug!("Batch {}: {} URLs", stats.batches, batch.len());

            let max_depth = self.frontier.max_depth();
            let fetcher = &self.fetcher;
            let scope = self.scope.as_ref();
            let mode = self.mode;

            let mut in_flight: FuturesUnordered<_> = batch
                .into_iter()
                .filter(|entry| {
                    let allowed = entry.depth <= max_depth;
                    if !allowed {
                        tracing::debug!("Skipping {} beyond max depth", entry.url);
                    }
                    allowed
                })
                .map(|entry| visit(fetcher, scope, mode, max_depth, entry))
                .collect();

            while let Some(mut done) = in_flight.next().await {
                stats.dispatched += 1;
                if done.outcome.is_failure() {
                    stats.failed += 1;
                } else {
                    stats.fetched += 1;
                }

                // A page reached through a redirect is kept under its final
                // URL, and dropped if that URL was already visited
                if let Some(target) = done.redirected_to.take() {
                    if !self.frontier.mark_visited(&target) {
                        tracing::info!(
                            "Skipping {}: redirects to already visited {}",
                            done.outcome.url(),
                            target
                        );
                        stats.redirects_collapsed += 1;
                        continue;
                    }
                    if self.scope.as_ref().map_or(true, |scope| scope.contains(&target)) {
                        done.outcome.relocate(target.to_string());
                    }
                }

                let next_depth = done.outcome.depth() + 1;
                let mut queued = 0;
                for link in done.links {
                    if self.frontier.offer(link, next_depth) {
                        queued += 1;
                    }
                }
                stats.links_queued += queued;

                if !done.outcome.is_failure() {
                    tracing::info!(
                        "Fetched {} (depth {}, {} new links)",
                        done.outcome.url(),
                        done.outcome.depth(),
                        queued
                    );
                }

                if let Err(e) = sink.record(&done.outcome) {
                    tracing::warn!("Failed to persist {}: {}", done.outcome.url(), e);
                    stats.persistence_failures += 1;
                }
            }

            if let Err(e) = sink.end_batch() {
                tracing::warn!("Failed to write output after batch {}: {}", stats.batches, e);
                stats.persistence_failures += 1;
            }

            tracing::info!(
                "Progress: {} pages done, {} pending, {} in output",
                stats.dispatched,
                self.frontier.pending_len(),
                sink.len()
            );
        }

        sink.finish()?;

        stats.output_entries = sink.len() as u64;
        stats.finish(started.elapsed());

        tracing::info!(
            "{} run finished: {} unique entries in output, {} fetched, {} failed, in {:.2}s",
            self.mode,
            stats.output_entries,
            stats.fetched,
            stats.failed,
            stats.elapsed.as_secs_f64()
        );

        Ok(stats)
    }
}

/// Fetches one entry and extracts what the mode needs from it
async fn visit<F: Fetcher>(
    fetcher: &F,
    scope: Option<&Scope>,
    mode: CrawlMode,
    max_depth: u32,
    entry: FrontierEntry,
) -> Visit {
    tracing::info!("Crawling {} (depth {})", entry.url, entry.depth);

    match fetcher.fetch(&entry.url).await {
        Ok(page) => {
            let redirected_to = canonicalize_url(page.final_url.clone())
                .ok()
                .filter(|target| *target != entry.url);

            // Links from the deepest level would be rejected by the frontier anyway
            let links = match scope {
                Some(scope) if entry.depth < max_depth => {
                    extract_links(&page.body, &page.final_url, scope)
                        .into_iter()
                        .collect()
                }
                _ => Vec::new(),
            };

            let content = mode
                .scrapes_content()
                .then(|| extract_content(&page.body));

            Visit {
                outcome: PageOutcome::Fetched {
                    url: entry.url.to_string(),
                    depth: entry.depth,
                    content,
                },
                links,
                redirected_to,
            }
        }
        Err(e) => {
            tracing::warn!("Error fetching {}: {}", entry.url, e);
            Visit {
                outcome: PageOutcome::Failed {
                    url: entry.url.to_string(),
                    depth: entry.depth,
                    error: e.to_string(),
                },
                links: Vec::new(),
                redirected_to: None,
            }
        }
    }
}
