//! Output module for persisting crawl results
//!
//! This module handles:
//! - The sorted link list written in link-generation mode
//! - The incremental JSON record array written when scraping
//! - Run statistics and the final summary

mod json_records;
mod link_list;
pub mod stats;
mod traits;

pub use json_records::{read_records, JsonRecordSink};
pub use link_list::{read_link_list, LinkListSink};
pub use stats::{print_statistics, CrawlStats};
pub use traits::{OutputError, OutputResult, PageOutcome, Record, Sink};
