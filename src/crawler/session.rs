//! Crawl session state and engine lifecycle states
//!
//! A session holds everything one crawl run mutates. It is replaced on every
//! new start and left intact after the run ends, so statistics stay readable.

use crate::crawler::frontier::Frontier;
use crate::crawler::parser::PageRecord;
use crate::url::CrawlTarget;
use std::fmt;

/// Lifecycle of the crawl engine
///
/// `Idle → Running → {Completed, Stopped}`. A finished run never returns to
/// `Running`; a new start creates a new session instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineState {
    /// No crawl has been started yet
    #[default]
    Idle,

    /// The crawl loop is active
    Running,

    /// The frontier was exhausted or the page limit was reached
    Completed,

    /// The run was cancelled or ended on a critical loop error
    Stopped,
}

impl EngineState {
    /// Returns true for `Completed` and `Stopped`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }

    /// Returns true when a new run may be started from this state
    pub fn can_start(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

/// Snapshot of crawl counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Targets fetched or fetch-attempted
    pub visited_count: usize,
    /// Targets waiting in the frontier
    pub queue_size: usize,
    /// Page records collected
    pub data_count: usize,
}

impl CrawlStatistics {
    /// Visited plus queued targets
    pub fn total_discovered(&self) -> usize {
        self.visited_count + self.queue_size
    }
}

/// Mutable state of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlSession {
    seed: CrawlTarget,
    domain: String,
    pub(crate) frontier: Frontier,
    pub(crate) records: Vec<PageRecord>,
}

impl CrawlSession {
    /// Creates a session whose frontier holds only the seed
    pub fn new(seed: CrawlTarget, domain: String) -> Self {
        Self {
            frontier: Frontier::with_seed(seed.clone()),
            seed,
            domain,
            records: Vec::new(),
        }
    }

    /// The canonical seed
    pub fn seed(&self) -> &CrawlTarget {
        &self.seed
    }

    /// Origin every crawled target must share, fixed for the session
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Frontier and visited set
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Records in completion order
    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    /// Current counters
    pub fn statistics(&self) -> CrawlStatistics {
        CrawlStatistics {
            visited_count: self.frontier.visited_len(),
            queue_size: self.frontier.len(),
            data_count: self.records.len(),
        }
    }
}
