//! Sink interface through which the crawl engine reports
//!
//! Sinks are called from the crawl loop task. A consumer that needs the
//! events on its own thread or task should forward them, for example through
//! the [`CrawlEvent`] channel implementation below.

use crate::crawler::parser::PageRecord;
use tokio::sync::mpsc::UnboundedSender;

/// Receiver of crawl notifications
///
/// Implementations must be thread-safe. Failures inside a sink are the
/// sink's own business; the engine never retries a notification.
pub trait CrawlSink: Send + Sync {
    /// A notable event: fetch attempt, link count, error, banner
    fn on_log(&self, message: &str);

    /// Fired once per processed URL
    ///
    /// # Arguments
    ///
    /// * `visited` - Targets fetched or fetch-attempted so far
    /// * `total_discovered` - `visited` plus targets still queued
    fn on_progress(&self, visited: usize, total_discovered: usize);

    /// Fired exactly once per run with every collected record
    fn on_completion(&self, records: &[PageRecord]);
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl CrawlSink for NoopSink {
    fn on_log(&self, _message: &str) {}

    fn on_progress(&self, _visited: usize, _total_discovered: usize) {}

    fn on_completion(&self, _records: &[PageRecord]) {}
}

/// A sink notification as a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Log(String),
    Progress { visited: usize, total: usize },
    Completed(Vec<PageRecord>),
}

/// Forwards every notification over an unbounded channel
///
/// Send errors mean the receiver is gone and are ignored.
impl CrawlSink for UnboundedSender<CrawlEvent> {
    fn on_log(&self, message: &str) {
        let _ = self.send(CrawlEvent::Log(message.to_string()));
    }

    fn on_progress(&self, visited: usize, total_discovered: usize) {
        let _ = self.send(CrawlEvent::Progress {
            visited,
            total: total_discovered,
        });
    }

    fn on_completion(&self, records: &[PageRecord]) {
        let _ = self.send(CrawlEvent::Completed(records.to_vec()));
    }
}
