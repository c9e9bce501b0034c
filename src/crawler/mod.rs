//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching over a shared connection pool
//! - Link extraction limited to the crawl scope
//! - Main-text extraction for scraped pages
//! - The frontier and the batch scheduler
//!
//! Three run modes share that machinery: link generation, content scraping,
//! and replay of a previously generated link list.

mod content;
mod fetcher;
mod frontier;
mod links;
mod scheduler;

pub use content::extract_content;
pub use fetcher::{build_http_client, fetch_url, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use links::extract_links;
pub use scheduler::Scheduler;

use crate::config::Config;
use crate::output::{read_link_list, CrawlStats, JsonRecordSink, LinkListSink};
use crate::url::{canonicalize, Scope};
use crate::TrawlError;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// What a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Crawl and emit the sorted list of visited URLs
    Links,
    /// Crawl and emit `{URL, content}` records
    Content,
    /// Scrape a saved link list without crawling
    Replay,
}

impl CrawlMode {
    /// Returns true if pages are rendered to text
    pub fn scrapes_content(self) -> bool {
        matches!(self, Self::Content | Self::Replay)
    }

    /// What the output artifact holds, for summaries
    pub fn output_noun(self) -> &'static str {
        match self {
            Self::Links => "Unique URLs",
            Self::Content | Self::Replay => "Records",
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Links => "link generation",
            Self::Content => "content scraping",
            Self::Replay => "replay",
        };
        f.write_str(name)
    }
}

/// Per-run options that do not come from the configuration file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Ignore any existing output artifact instead of resuming from it
    pub fresh: bool,

    /// Cancelled to stop after the current batch
    pub cancel: CancellationToken,
}

/// Runs link-generation mode against the network
///
/// Crawls from `start_url` and keeps `links_file` as the sorted list of every
/// URL visited so far, rewritten after each batch.
///
/// # Example
///
/// ```no_run
/// use trawl::config::load_config;
/// use trawl::crawler::{generate_links, RunOptions};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = generate_links(&config, RunOptions::default()).await?;
/// println!("{} URLs", stats.output_entries);
/// # Ok(())
/// # }
/// ```
pub async fn generate_links(config: &Config, options: RunOptions) -> Result<CrawlStats, TrawlError> {
    let fetcher = HttpFetcher::new(&config.http)?;
    generate_links_with(config, fetcher, options).await
}

/// Runs link-generation mode with the given fetcher
pub async fn generate_links_with<F: Fetcher>(
    config: &Config,
    fetcher: F,
    options: RunOptions,
) -> Result<CrawlStats, TrawlError> {
    let path = config.links_file()?;
    let start = canonicalize(&config.start_url)?;

    let mut sink = LinkListSink::open(path, !options.fresh)?;

    let mut frontier = Frontier::new(config.max_depth);
    frontier.load_existing(sink.urls().iter().cloned());
    frontier.seed(start.clone());

    let mut scheduler = Scheduler::new(fetcher, frontier, CrawlMode::Links, config.max_concurrent)
        .with_scope(Scope::from_start(&start))
        .with_cancellation(options.cancel);

    let stats = scheduler.run(&mut sink).await?;
    tracing::info!("Generated links saved to {}", path.display());
    Ok(stats)
}

/// Runs content scraping, or replay when `use_generated_links` is set
pub async fn scrape(config: &Config, options: RunOptions) -> Result<CrawlStats, TrawlError> {
    let fetcher = HttpFetcher::new(&config.http)?;
    scrape_with(config, fetcher, options).await
}

/// Runs content scraping or replay with the given fetcher
///
/// Each record is appended to `output_file` as soon as its page is done.
/// Records already in the file (from an interrupted run) are kept and their
/// URLs are not fetched again unless `options.fresh` is set.
pub async fn scrape_with<F: Fetcher>(
    config: &Config,
    fetcher: F,
    options: RunOptions,
) -> Result<CrawlStats, TrawlError> {
    let output_path = config.output_file()?;
    let mode = if config.use_generated_links {
        CrawlMode::Replay
    } else {
        CrawlMode::Content
    };

    // Read replay input before the output file is opened for writing
    let replay_urls = match mode {
        CrawlMode::Replay => {
            let links_path = config.links_file()?;
            let lines = read_link_list(links_path)?;
            tracing::info!("Replaying {} URLs from {}", lines.len(), links_path.display());
            lines
        }
        _ => Vec::new(),
    };
    let start = canonicalize(&config.start_url)?;

    let (mut sink, existing) = JsonRecordSink::open(output_path, !options.fresh)?;

    let mut frontier = Frontier::new(config.max_depth);
    frontier.load_existing(existing.into_iter().map(|record| record.url));

    let scheduler = match mode {
        CrawlMode::Replay => {
            for line in &replay_urls {
                match canonicalize(line) {
                    Ok(url) => {
                        frontier.offer(url, 0);
                    }
                    Err(e) => tracing::warn!("Skipping invalid URL '{}': {}", line, e),
                }
            }
            Scheduler::new(fetcher, frontier, mode, config.max_concurrent)
        }
        _ => {
            frontier.seed(start.clone());
            Scheduler::new(fetcher, frontier, mode, config.max_concurrent)
                .with_scope(Scope::from_start(&start))
        }
    };

    let mut scheduler = scheduler.with_cancellation(options.cancel);
    let stats = scheduler.run(&mut sink).await?;
    tracing::info!("Data successfully saved to {}", output_path.display());
    Ok(stats)
}
