//! URL Grabby: a same-domain web crawler
//!
//! This crate crawls every page reachable from a seed URL within the seed's
//! origin, collecting the URL, `<title>` and first `<h1>` of each HTML page.
//! The crawl loop runs on a background task and reports through a
//! [`crawler::CrawlSink`].

pub mod config;
pub mod crawler;
pub mod export;
pub mod url;

use thiserror::Error;

/// Main error type for URL Grabby operations
#[derive(Debug, Error)]
pub enum GrabbyError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Critical error in crawl loop: {0}")]
    CriticalLoop(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// CSV export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to save")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for URL Grabby operations
pub type Result<T> = std::result::Result<T, GrabbyError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlSink, EngineState, PageRecord};
pub use url::{canonicalize, domain_of, is_in_scope, CrawlTarget};
