//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with content-type gating
//! - HTML parsing and link extraction
//! - The frontier and visited set
//! - The crawl engine, its sessions and its sink interface

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod session;
mod sink;

pub use engine::{CrawlEngine, STOP_TIMEOUT};
pub use fetcher::{build_http_client, is_html, FetchResult, Fetcher, FetcherConfig, DEFAULT_TIMEOUT};
pub use frontier::Frontier;
pub use parser::{extract_links, extract_record, parse_page, ExtractedLinks, PageRecord, ParsedPage};
pub use session::{CrawlSession, CrawlStatistics, EngineState};
pub use sink::{CrawlEvent, CrawlSink, NoopSink};
