//! Sink trait and associated types
//!
//! A sink persists crawl results as they are produced. The scheduler reports
//! every dispatched page to it, then tells it when a batch is complete and
//! when the run ends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt artifact {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One scraped page, the interchange shape of the scrape artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "URL")]
    pub url: String,

    pub content: String,
}

/// What happened to one dispatched URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was fetched; `content` is set in content-scraping modes
    Fetched {
        url: String,
        depth: u32,
        content: Option<String>,
    },

    /// The fetch failed; the URL is visited but has no result
    Failed {
        url: String,
        depth: u32,
        error: String,
    },
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Fetched { url, .. } | Self::Failed { url, .. } => url,
        }
    }

    pub fn depth(&self) -> u32 {
        match self {
            Self::Fetched { depth, .. } | Self::Failed { depth, .. } => *depth,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Reports the outcome under a different URL, e.g. a redirect target
    pub fn relocate(&mut self, new_url: String) {
        match self {
            Self::Fetched { url, .. } | Self::Failed { url, .. } => *url = new_url,
        }
    }
}

/// Trait for crawl output sinks
///
/// Write failures are reported to the caller, which logs them and keeps
/// crawling; `end_batch` is the retry point for sinks that rewrite their
/// artifact.
pub trait Sink {
    /// Records the outcome of one dispatched URL
    fn record(&mut self, outcome: &PageOutcome) -> OutputResult<()>;

    /// Called after every page of a batch has been recorded
    fn end_batch(&mut self) -> OutputResult<()>;

    /// Called once when the run ends, including cancelled runs
    fn finish(&mut self) -> OutputResult<()>;

    /// Number of entries the artifact holds
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
