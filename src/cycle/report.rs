use super::{CycleReason, StateFingerprint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A visit that was suppressed by the cycle detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleEntry {
    /// URL as it was dequeued
    pub url: String,
    pub fingerprint: StateFingerprint,
    pub reason: CycleReason,
    /// How many visits of this normalized URL have been suppressed so far, this one included
    pub count: u32,
    pub detected_at: DateTime<Utc>,
}

/// Aggregated view over all suppressed visits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub entries: Vec<CycleEntry>,
    pub total_cycles_detected: usize,
    pub duplicate_states: usize,
    pub parameterized_url_limits: usize,
    pub infinite_scrolls: usize,
}

impl CycleReport {
    /// Number of entries recorded for `reason`
    pub fn count_for(&self, reason: CycleReason) -> usize {
        match reason {
            CycleReason::DuplicateState => self.duplicate_states,
            CycleReason::ParameterizedUrlLimit => self.parameterized_url_limits,
            CycleReason::InfiniteScroll => self.infinite_scrolls,
        }
    }
}

/// Builds a report from the recorded entries, preserving their order
pub fn create_cycle_report(entries: &[CycleEntry]) -> CycleReport {
    let mut report = CycleReport {
        entries: entries.to_vec(),
        total_cycles_detected: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        match entry.reason {
            CycleReason::DuplicateState => report.duplicate_states += 1,
            CycleReason::ParameterizedUrlLimit => report.parameterized_url_limits += 1,
            CycleReason::InfiniteScroll => report.infinite_scrolls += 1,
        }
    }

    report
}
