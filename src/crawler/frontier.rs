//! Frontier and visited set driving crawl order
//!
//! Targets are handed out in insertion order (breadth-first from the seed).
//! That order is a convenience, not a guarantee callers may rely on.

use crate::url::CrawlTarget;
use std::collections::{HashSet, VecDeque};

/// Queue of targets still to fetch plus the set of targets already attempted
///
/// A target is never in both sets at once: [`Frontier::try_enqueue`] refuses
/// anything queued or visited, and [`Frontier::dequeue`] removes a target from
/// the queue before the caller marks it visited.
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    queue: VecDeque<CrawlTarget>,
    queued: HashSet<CrawlTarget>,
    visited: HashSet<CrawlTarget>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the seed
    pub fn with_seed(seed: CrawlTarget) -> Self {
        let mut frontier = Self::new();
        frontier.try_enqueue(seed);
        frontier
    }

    /// Queues a newly discovered target
    ///
    /// Returns false without changing anything when the target is already
    /// queued or visited.
    pub fn try_enqueue(&mut self, target: CrawlTarget) -> bool {
        if self.visited.contains(&target) || self.queued.contains(&target) {
            return false;
        }
        self.queued.insert(target.clone());
        self.queue.push_back(target);
        true
    }

    /// Removes and returns the next target, if any
    pub fn dequeue(&mut self) -> Option<CrawlTarget> {
        let target = self.queue.pop_front()?;
        self.queued.remove(&target);
        Some(target)
    }

    /// Records that a fetch of `target` is about to start
    ///
    /// Also drops the target from the queue if it is still there, so the
    /// disjointness invariant holds even for callers that skip `dequeue`.
    pub fn mark_visited(&mut self, target: CrawlTarget) {
        if self.queued.remove(&target) {
            self.queue.retain(|queued| queued != &target);
        }
        self.visited.insert(target);
    }

    /// Returns true when a fetch of `target` was already attempted
    pub fn is_visited(&self, target: &CrawlTarget) -> bool {
        self.visited.contains(target)
    }

    /// Returns true when `target` is waiting in the queue
    pub fn is_queued(&self, target: &CrawlTarget) -> bool {
        self.queued.contains(target)
    }

    /// Number of targets waiting to be fetched
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true when nothing is waiting to be fetched
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of targets fetched or fetch-attempted
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Visited targets, in no particular order
    pub fn visited(&self) -> impl Iterator<Item = &CrawlTarget> {
        self.visited.iter()
    }
}
