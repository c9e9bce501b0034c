//! Extractive summaries of a scraped corpus
//!
//! Reads the `{URL, content}` record array written by a scrape run and
//! produces a `{title, content}` array where each content is the handful of
//! sentences that best represent the page.

mod scorer;

pub use scorer::{split_sentences, summarize_text};

use crate::config::Config;
use crate::output::{read_records, Record};
use crate::url::canonicalize;
use crate::TrawlError;
use serde::{Deserialize, Serialize};
use std::fs;

/// One summarized page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub content: String,
}

/// Derives a page title from its URL relative to the crawl start
///
/// The start URL prefix is removed and surrounding slashes trimmed, so
/// `https://docs.test/guide/install/` under `https://docs.test/guide/`
/// becomes `install`.
pub fn title_for(url: &str, start_url: &str) -> String {
    url.strip_prefix(start_url)
        .unwrap_or(url)
        .trim_matches('/')
        .to_string()
}

/// Summarizes each record, keeping at most `sentences` sentences per page
pub fn summarize_records(records: &[Record], start_url: &str, sentences: usize) -> Vec<Summary> {
    // Record URLs are canonical, so compare against the canonical start URL
    let prefix = canonicalize(start_url)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| start_url.to_string());

    records
        .iter()
        .map(|record| Summary {
            title: title_for(&record.url, &prefix),
            content: summarize_text(&record.content, sentences),
        })
        .collect()
}

/// Summarizes `output_file` into `summary_file`
///
/// # Returns
///
/// * `Ok(usize)` - Number of summaries written
/// * `Err(TrawlError)` - A path is missing or a file could not be read or written
pub fn summarize_file(config: &Config) -> Result<usize, TrawlError> {
    let input = config.output_file()?;
    let output = config.summary_file()?;

    let records = read_records(input)?;
    tracing::info!("Summarizing {} records from {}", records.len(), input.display());

    let summaries = summarize_records(&records, &config.start_url, config.summary_sentences);
    let json = serde_json::to_string_pretty(&summaries)?;
    fs::write(output, json)?;

    tracing::info!("Processed data saved to {}", output.display());
    Ok(summaries.len())
}
