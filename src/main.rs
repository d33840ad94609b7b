//! URL Grabby main entry point
//!
//! This is the command-line interface for the URL Grabby crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use url_grabby::config::{load_config, validate_delay, Config};
use url_grabby::crawler::{CrawlEngine, CrawlEvent, EngineState};
use url_grabby::export::{export_csv, print_statistics, timestamped_filename};
use url_grabby::url::{domain_of, with_default_scheme};
use url_grabby::ExportError;

/// URL Grabby: a same-domain web crawler
///
/// Crawls every page reachable from the seed URL within the same origin and
/// exports the URL, title and main heading of each page to CSV.
#[derive(Parser, Debug)]
#[command(name = "url-grabby")]
#[command(version = "1.0.0")]
#[command(about = "A same-domain web crawler", long_about = None)]
struct Cli {
    /// Starting URL; https:// is assumed when no scheme is given
    #[arg(value_name = "URL")]
    seed: String,

    /// Delay between requests in seconds (0-60)
    #[arg(short, long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// CSV output path (default: timestamped file in the configured directory)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    let delay_seconds = match cli.delay {
        Some(delay) => validate_delay(delay).context("Invalid --delay")?,
        None => config.crawler.delay_seconds,
    };

    let seed = with_default_scheme(&cli.seed);
    if domain_of(&seed).is_empty() {
        bail!("Invalid starting URL: {}", cli.seed);
    }

    let output = cli.output.clone().unwrap_or_else(|| {
        Path::new(&config.output.directory).join(timestamped_filename(&config.output.file_stem))
    });

    handle_crawl(&config, &seed, Duration::from_secs_f64(delay_seconds), &output, cli.quiet)
        .await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("url_grabby=warn"),
            1 => EnvFilter::new("url_grabby=info,warn"),
            2 => EnvFilter::new("url_grabby=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one crawl, printing events until it finishes, then exports
async fn handle_crawl(
    config: &Config,
    seed: &str,
    delay: Duration,
    output: &Path,
    quiet: bool,
) -> anyhow::Result<()> {
    let (tx, mut events) = mpsc::unbounded_channel::<CrawlEvent>();
    let engine = Arc::new(
        CrawlEngine::new(config, Arc::new(tx)).context("Failed to build HTTP client")?,
    );

    let started = Instant::now();
    if !engine.start(seed, delay) {
        bail!("Could not start crawling {}", seed);
    }

    let stopper = Arc::clone(&engine);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.stop().await;
        }
    });

    let mut records = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            CrawlEvent::Log(message) => {
                if !quiet {
                    println!("{}", message);
                }
            }
            CrawlEvent::Progress { visited, total } => {
                tracing::debug!("Progress: {}/{}", visited, total);
            }
            CrawlEvent::Completed(collected) => {
                records = collected;
                break;
            }
        }
    }

    let state = engine.wait().await;
    if !quiet {
        print_statistics(state, &engine.statistics(), started.elapsed());
    }

    let exported = export_csv(&records, output);
    if let Err(e @ (ExportError::Io(_) | ExportError::Csv(_))) = &exported {
        eprintln!("✗ Error saving CSV: {}", e);
    }
    if let Some(summary) = export_summary(&exported, output, quiet) {
        println!("{}", summary);
    }

    if state == EngineState::Stopped {
        tracing::info!("Crawl was stopped before the frontier was exhausted");
    }

    Ok(())
}

/// Stdout summary of an export; write failures go to stderr separately
fn export_summary(
    exported: &Result<usize, ExportError>,
    output: &Path,
    quiet: bool,
) -> Option<String> {
    if quiet {
        return None;
    }

    match exported {
        Ok(rows) => Some(format!(
            "✓ Data saved to: {}\n  {} pages exported",
            output.display(),
            rows
        )),
        Err(ExportError::Empty) => Some("No data to save!".to_string()),
        Err(_) => None,
    }
}
