use crate::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default batch size / concurrency cap
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Default number of sentences kept per summary
pub const DEFAULT_SUMMARY_SENTENCES: usize = 5;

/// Main configuration structure for Trawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Crawl root; also defines the crawl scope
    pub start_url: String,

    /// Entries beyond this depth are never enqueued
    pub max_depth: u32,

    /// Batch size and cap on simultaneous in-flight fetches
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Link list output (link generation) or input (replay)
    #[serde(default)]
    pub links_file: Option<PathBuf>,

    /// Scraped record output
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// Replay `links_file` instead of crawling live
    #[serde(default)]
    pub use_generated_links: bool,

    /// Summaries written by the `summarize` command
    #[serde(default)]
    pub summary_file: Option<PathBuf>,

    /// Sentences kept per summarized page
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,

    #[serde(default)]
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Config {
    /// Builds a configuration with defaults for everything but the crawl root and depth
    pub fn new(start_url: impl Into<String>, max_depth: u32) -> Self {
        Self {
            start_url: start_url.into(),
            max_depth,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            links_file: None,
            output_file: None,
            use_generated_links: false,
            summary_file: None,
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            http: HttpConfig::default(),
        }
    }

    /// Returns `links_file`, or a `MissingKey` error when the mode needs it and it is absent
    pub fn links_file(&self) -> Result<&Path, ConfigError> {
        self.links_file
            .as_deref()
            .ok_or(ConfigError::MissingKey("links_file"))
    }

    /// Returns `output_file`, or a `MissingKey` error
    pub fn output_file(&self) -> Result<&Path, ConfigError> {
        self.output_file
            .as_deref()
            .ok_or(ConfigError::MissingKey("output_file"))
    }

    /// Returns `summary_file`, or a `MissingKey` error
    pub fn summary_file(&self) -> Result<&Path, ConfigError> {
        self.summary_file
            .as_deref()
            .ok_or(ConfigError::MissingKey("summary_file"))
    }
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

fn default_summary_sentences() -> usize {
    DEFAULT_SUMMARY_SENTENCES
}

fn default_user_agent() -> String {
    format!("trawl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}
