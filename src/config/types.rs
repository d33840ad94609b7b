use serde::Deserialize;

/// Main configuration structure for URL Grabby
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Pause between two requests (seconds)
    #[serde(rename = "delay-seconds")]
    pub delay_seconds: f64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// Stop after this many visited pages, 0 means unlimited
    #[serde(rename = "max-pages")]
    pub max_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 1.0,
            timeout_seconds: 10,
            max_pages: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Free-form comment appended in parentheses
    pub comment: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (Comment)`
    pub fn header_value(&self) -> String {
        if self.comment.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} ({})",
                self.crawler_name, self.crawler_version, self.comment
            )
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "URL-Grabby".to_string(),
            crawler_version: "1.0".to_string(),
            comment: "Educational Web Crawler".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives timestamped CSV exports
    pub directory: String,

    /// Base name of timestamped CSV exports
    #[serde(rename = "file-stem")]
    pub file_stem: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            file_stem: "url_grabby".to_string(),
        }
    }
}
