//! Configuration module for URL Grabby
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every key has a default, so a crawl can run without a file.
//!
//! # Example
//!
//! ```no_run
//! use url_grabby::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("grabby.toml")).unwrap();
//! println!("Request timeout: {}s", config.crawler.timeout_seconds);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_delay, MAX_DELAY_SECONDS};
