//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building one pooled HTTP client with the identifying user agent
//! - GET requests with a fixed timeout
//! - Content-Type gating (only HTML bodies are kept)
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::url::CrawlTarget;
use reqwest::Client;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML; the body was discarded
    NonHtml {
        /// The actual Content-Type received (empty when absent)
        content_type: String,
    },

    /// Server answered with a 4xx/5xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Transport failure (timeout, connection, DNS, TLS, body read)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// One-line description used in crawl logs
    pub fn describe(&self) -> String {
        match self {
            Self::Success { content_type, body } => {
                format!("{} bytes of {}", body.len(), content_type)
            }
            Self::NonHtml { content_type } if content_type.is_empty() => {
                "no content type".to_string()
            }
            Self::NonHtml { content_type } => format!("non-HTML content ({})", content_type),
            Self::HttpError { status_code } => format!("HTTP {}", status_code),
            Self::NetworkError { error } => error.clone(),
        }
    }
}

/// Settings for building a [`Fetcher`]
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Value of the `User-Agent` header
    pub user_agent: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl FetcherConfig {
    /// Derives fetcher settings from the crawler and user agent configuration
    pub fn from_config(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Self {
        Self {
            user_agent: user_agent.header_value(),
            timeout: Duration::from_secs(crawler.timeout_seconds),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default(), &UserAgentConfig::default())
    }
}

/// Issues GET requests over a shared, keep-alive connection pool
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Builds the fetcher and its HTTP client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use url_grabby::crawler::{Fetcher, FetcherConfig};
    ///
    /// let fetcher = Fetcher::new(&FetcherConfig::default()).unwrap();
    /// ```
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Fetches a target with error classification
    ///
    /// # Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx/3xx with `html` in Content-Type | `Success` |
    /// | 2xx/3xx with any other Content-Type | `NonHtml` |
    /// | 4xx / 5xx | `HttpError` |
    /// | Timeout, connect, DNS, TLS, body read | `NetworkError` |
    ///
    /// Redirects are followed by the client. Failures are never retried.
    pub async fn fetch(&self, target: &CrawlTarget) -> FetchResult {
        tracing::debug!("GET {}", target);

        let response = match self.client.get(target.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                let result = classify_transport_error(&e);
                tracing::debug!("Fetch failed for {}: {}", target, result.describe());
                return result;
            }
        };

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            tracing::debug!("Fetch failed for {}: HTTP {}", target, status.as_u16());
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            tracing::debug!("Skipping non-HTML content at {}: {:?}", target, content_type);
            return FetchResult::NonHtml { content_type };
        }

        match response.text().await {
            Ok(body) => {
                tracing::debug!("Fetched {} ({} bytes)", target, body.len());
                FetchResult::Success { content_type, body }
            }
            Err(e) => {
                let result = classify_transport_error(&e);
                tracing::debug!("Body read failed for {}: {}", target, result.describe());
                result
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout)
        .connect_timeout(config.timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true when a Content-Type header value denotes HTML
pub fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("html")
}

fn classify_transport_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if let Some(status) = e.status() {
        format!("HTTP {}", status.as_u16())
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}
