//! Run statistics
//!
//! Counters gathered by the scheduler during a run and the final summary
//! printed when it ends.

use crate::crawler::CrawlMode;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStats {
    pub mode: CrawlMode,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    pub elapsed: Duration,

    /// URLs handed to the fetcher
    pub dispatched: u64,

    /// Successful fetches
    pub fetched: u64,

    /// Failed fetches
    pub failed: u64,

    /// In-scope links newly queued
    pub links_queued: u64,

    /// Pages dropped because they redirected to an already visited URL
    pub redirects_collapsed: u64,

    /// Batches processed
    pub batches: u64,

    /// URLs carried over from a previous run
    pub resumed: u64,

    /// Entries in the output artifact at the end of the run
    pub output_entries: u64,

    /// Sink writes that failed and were skipped or retried
    pub persistence_failures: u64,

    /// The run stopped early on request
    pub cancelled: bool,
}

impl CrawlStats {
    /// Creates an empty statistics record stamped with the current time
    pub fn new(mode: CrawlMode) -> Self {
        Self {
            mode,
            started_at: Utc::now(),
            finished_at: None,
            elapsed: Duration::ZERO,
            dispatched: 0,
            fetched: 0,
            failed: 0,
            links_queued: 0,
            redirects_collapsed: 0,
            batches: 0,
            resumed: 0,
            output_entries: 0,
            persistence_failures: 0,
            cancelled: false,
        }
    }

    /// Stamps the finish time
    pub fn finish(&mut self, elapsed: Duration) {
        self.finished_at = Some(Utc::now());
        self.elapsed = elapsed;
    }

    /// Fetch success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.dispatched == 0 {
            return 0.0;
        }
        (self.fetched as f64 / self.dispatched as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Summary ({}) ===\n", stats.mode);

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    println!("  Elapsed: {:.2} seconds", stats.elapsed.as_secs_f64());
    if stats.cancelled {
        println!("  Status: cancelled (current batch was completed and saved)");
    }
    println!();

    println!("Pages:");
    println!("  Dispatched: {}", stats.dispatched);
    println!("  Fetched: {}", stats.fetched);
    println!("  Failed: {}", stats.failed);
    println!("  Links queued: {}", stats.links_queued);
    if stats.redirects_collapsed > 0 {
        println!("  Redirects to visited pages: {}", stats.redirects_collapsed);
    }
    println!("  Batches: {}", stats.batches);
    if stats.resumed > 0 {
        println!("  Carried over from previous run: {}", stats.resumed);
    }
    println!();

    println!("Output:");
    println!("  {}: {}", stats.mode.output_noun(), stats.output_entries);
    if stats.persistence_failures > 0 {
        println!("  Failed writes: {}", stats.persistence_failures);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        stats.success_rate(),
        stats.fetched,
        stats.dispatched
    );
}
