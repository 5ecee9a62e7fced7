//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and the
//! summary record they render.

use crate::coverage::CoverageMetrics;
use crate::crawler::ExplorationResult;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary statistics for one exploration
#[derive(Debug, Clone, Default)]
pub struct ExplorationSummary {
    // Run metadata
    pub start_url: String,
    pub strategy: String,
    pub config_hash: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub duration_seconds: Option<i64>,
    pub termination: String,

    // Overall statistics
    pub total_nodes: usize,
    pub total_edges: usize,
    pub total_journeys: usize,
    pub total_cycles: usize,
    pub skipped_urls: usize,
    pub unresolved_edges: usize,

    pub coverage: CoverageMetrics,

    // Breakdowns (label -> count)
    pub edges_by_action: BTreeMap<String, usize>,
    pub journeys_by_type: BTreeMap<String, usize>,
    pub cycles_by_reason: BTreeMap<String, usize>,
    pub skip_reasons: BTreeMap<String, usize>,
}

impl ExplorationSummary {
    /// Returns the number of dequeued URLs that ended in any outcome
    pub fn total_dequeued(&self) -> usize {
        self.total_nodes + self.total_cycles + self.skipped_urls
    }

    /// Returns the share of dequeued URLs that became new nodes, as a percentage
    pub fn yield_rate(&self) -> f64 {
        let dequeued = self.total_dequeued();
        if dequeued == 0 {
            return 0.0;
        }
        (self.total_nodes as f64 / dequeued as f64) * 100.0
    }
}

/// Trait for output handlers
///
/// An output handler persists a finished exploration in one format.
pub trait OutputHandler {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Writes the exploration
    ///
    /// # Arguments
    ///
    /// * `result` - The finished exploration
    /// * `summary` - Statistics derived from `result`
    fn write(&self, result: &ExplorationResult, summary: &ExplorationSummary) -> OutputResult<()>;
}
