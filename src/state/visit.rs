/// Outcome definitions for one dequeued URL
///
/// Every URL taken from the frontier ends in exactly one of these outcomes.
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a dequeued URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitOutcome {
    // ===== Success =====
    /// A new page state was added to the graph
    Recorded,

    // ===== Suppressed =====
    /// The state was already explored, or its URL hit a loop limit
    Cycle,

    // ===== Skipped =====
    /// The URL is outside the exploration boundary
    OutOfScope,

    /// The engine could not load the URL
    NavigationFailed,

    /// The server answered with a 4xx or 5xx status
    ErrorStatus,

    /// The page loaded but could not be analyzed
    ExtractionFailed,
}

impl VisitOutcome {
    /// Returns true if the URL counts toward the skipped total
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::OutOfScope | Self::NavigationFailed | Self::ErrorStatus | Self::ExtractionFailed
        )
    }

    /// Returns true if a node was added
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Recorded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::Cycle => "cycle",
            Self::OutOfScope => "out-of-scope",
            Self::NavigationFailed => "navigation-failed",
            Self::ErrorStatus => "error-status",
            Self::ExtractionFailed => "extraction-failed",
        }
    }
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
