//! Configuration module for Trawl
//!
//! This module handles loading, parsing, and validating configuration files.
//! TOML is the default format; `.json` files are accepted with the same keys.
//!
//! # Example
//!
//! ```no_run
//! use trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HttpConfig, DEFAULT_MAX_CONCURRENT, DEFAULT_SUMMARY_SENTENCES};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
