//! Trawl main entry point
//!
//! This is the command-line interface for the Trawl site crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use trawl::config::{load_config_with_hash, Config};
use trawl::crawler::{generate_links, scrape, RunOptions};
use trawl::output::print_statistics;
use trawl::summarize::summarize_file;
use trawl::url::{canonicalize, Scope};

/// Trawl: a same-site, depth-bounded web crawler
///
/// Trawl walks a website breadth-first from a start URL without leaving the
/// start URL's host and path prefix. It can list every page it finds, scrape
/// the readable text of each page into a JSON file, and summarize the result.
#[derive(Parser, Debug)]
#[command(name = "trawl")]
#[command(version)]
#[command(about = "A same-site, depth-bounded web crawler", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Start from scratch, ignoring any existing output file
    #[arg(long, global = true)]
    fresh: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the site and write the sorted list of page URLs to `links_file`
    Links {
        /// Path to TOML (or .json) configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Scrape page text into `output_file`, replaying `links_file` if
    /// `use_generated_links` is set
    Scrape {
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Summarize `output_file` into `summary_file`
    Summarize {
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Validate the configuration and show what would run
    Check {
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },
}

impl Command {
    fn config_path(&self) -> &PathBuf {
        match self {
            Self::Links { config }
            | Self::Scrape { config }
            | Self::Summarize { config }
            | Self::Check { config } => config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config_path = cli.command.config_path();
    tracing::info!("Loading configuration from: {}", config_path.display());
    let (config, hash) = load_config_with_hash(config_path)
        .with_context(|| format!("Failed to load configuration {}", config_path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    match &cli.command {
        Command::Links { .. } => {
            let stats = generate_links(&config, run_options(cli.fresh)).await?;
            print_statistics(&stats);
        }
        Command::Scrape { .. } => {
            let stats = scrape(&config, run_options(cli.fresh)).await?;
            print_statistics(&stats);
        }
        Command::Summarize { .. } => {
            let count = summarize_file(&config)?;
            println!("Summarized {} pages", count);
        }
        Command::Check { .. } => handle_check(&config)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawl=info,warn"),
            1 => EnvFilter::new("trawl=debug,info"),
            2 => EnvFilter::new("trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds run options whose token is cancelled on Ctrl-C
fn run_options(fresh: bool) -> RunOptions {
    if fresh {
        tracing::info!("Starting fresh (ignoring any existing output)");
    } else {
        tracing::info!("Starting run (will resume from existing output)");
    }

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; finishing the current batch");
            token.cancel();
        }
    });

    RunOptions { fresh, cancel }
}

/// Handles the `check` command: validates config and shows what would run
fn handle_check(config: &Config) -> anyhow::Result<()> {
    let start = canonicalize(&config.start_url).context("Invalid start_url")?;
    let scope = Scope::from_start(&start);

    println!("=== Trawl Configuration Check ===\n");

    println!("Crawl:");
    println!("  Start URL: {}", start);
    println!(
        "  Scope: {}://{}{}*",
        start.scheme(),
        start.host_str().unwrap_or_default(),
        scope.path_prefix()
    );
    println!("  Max depth: {}", config.max_depth);
    println!("  Max concurrent: {}", config.max_concurrent);
    println!("  Replay generated links: {}", config.use_generated_links);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Request timeout: {}s", config.http.request_timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);

    println!("\nFiles:");
    print_path("Links", config.links_file.as_ref());
    print_path("Output", config.output_file.as_ref());
    print_path("Summary", config.summary_file.as_ref());

    println!("\n✓ Configuration is valid");
    if config.use_generated_links {
        println!("✓ `scrape` would replay {}", path_or_missing(config.links_file.as_ref()));
    } else {
        println!("✓ `scrape` would crawl from {}", start);
    }

    Ok(())
}

fn print_path(label: &str, path: Option<&PathBuf>) {
    println!("  {}: {}", label, path_or_missing(path));
}

fn path_or_missing(path: Option<&PathBuf>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
