//! Exploration frontier
//!
//! The frontier is a plain double-ended queue of URLs waiting to be visited.
//! New URLs are always pushed to the back; the strategy decides which end
//! the next URL is taken from:
//! - breadth-first takes the front (oldest first, FIFO)
//! - depth-first takes the back (newest first, LIFO)

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Queue pop order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExplorationStrategy {
    #[default]
    BreadthFirst,
    DepthFirst,
}

impl ExplorationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BreadthFirst => "breadth-first",
            Self::DepthFirst => "depth-first",
        }
    }
}

impl fmt::Display for ExplorationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL waiting to be visited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedUrl {
    /// Absolute URL as discovered
    pub url: String,

    /// Link distance from the start URL
    pub depth: u32,
}

impl QueuedUrl {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Takes the next URL according to `strategy`
///
/// # Examples
///
/// ```
/// use discovery_engine::crawler::{pop, ExplorationStrategy, QueuedUrl};
/// use std::collections::VecDeque;
///
/// let mut queue: VecDeque<QueuedUrl> = ["a", "b"].iter().map(|u| QueuedUrl::new(*u, 1)).collect();
/// assert_eq!(pop(&mut queue, ExplorationStrategy::DepthFirst).unwrap().url, "b");
/// assert_eq!(pop(&mut queue, ExplorationStrategy::BreadthFirst).unwrap().url, "a");
/// assert!(pop(&mut queue, ExplorationStrategy::BreadthFirst).is_none());
/// ```
pub fn pop(queue: &mut VecDeque<QueuedUrl>, strategy: ExplorationStrategy) -> Option<QueuedUrl> {
    match strategy {
        ExplorationStrategy::BreadthFirst => queue.pop_front(),
        ExplorationStrategy::DepthFirst => queue.pop_back(),
    }
}
