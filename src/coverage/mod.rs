//! Coverage bookkeeping
//!
//! Three ratios describe how much of the reachable application an
//! exploration has seen: pages, interactive elements and paths (edges).

use serde::{Deserialize, Serialize};

/// `covered` out of `total`, with the percentage precomputed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRatio {
    pub covered: usize,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMetrics {
    pub page_coverage: CoverageRatio,
    pub element_coverage: CoverageRatio,
    pub path_coverage: CoverageRatio,
}

/// Minimum percentages an exploration should reach
///
/// Unset thresholds are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageThresholds {
    #[serde(default)]
    pub page: Option<f64>,
    #[serde(default)]
    pub element: Option<f64>,
    #[serde(default)]
    pub path: Option<f64>,
}

impl CoverageThresholds {
    pub fn is_empty(&self) -> bool {
        self.page.is_none() && self.element.is_none() && self.path.is_none()
    }
}

/// Outcome of `check_thresholds`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdCheck {
    pub met: bool,
    /// One line per unmet threshold
    pub details: Vec<String>,
}

/// Builds a ratio; a zero total yields 0%
///
/// # Examples
///
/// ```
/// use discovery_engine::coverage::ratio;
///
/// assert_eq!(ratio(1, 4).percentage, 25.0);
/// assert_eq!(ratio(0, 0).percentage, 0.0);
/// ```
pub fn ratio(covered: usize, total: usize) -> CoverageRatio {
    let percentage = if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    };

    CoverageRatio {
        covered,
        total,
        percentage,
    }
}

/// Builds the three coverage ratios from raw counts
pub fn calculate_coverage(
    pages_visited: usize,
    pages_total: usize,
    elements_activated: usize,
    elements_total: usize,
    paths_covered: usize,
    paths_total: usize,
) -> CoverageMetrics {
    CoverageMetrics {
        page_coverage: ratio(pages_visited, pages_total),
        element_coverage: ratio(elements_activated, elements_total),
        path_coverage: ratio(paths_covered, paths_total),
    }
}

/// Compares metrics against the configured thresholds
///
/// Only thresholds that are set are checked, so an empty set is always met.
pub fn check_thresholds(
    metrics: &CoverageMetrics,
    thresholds: &CoverageThresholds,
) -> ThresholdCheck {
    let checks = [
        ("Page", thresholds.page, metrics.page_coverage),
        ("Element", thresholds.element, metrics.element_coverage),
        ("Path", thresholds.path, metrics.path_coverage),
    ];

    let details: Vec<String> = checks
        .iter()
        .filter_map(|(name, threshold, actual)| {
            let threshold = (*threshold)?;
            (actual.percentage < threshold).then(|| {
                format!(
                    "{} coverage {:.1}% is below threshold {:.1}%",
                    name, actual.percentage, threshold
                )
            })
        })
        .collect();

    ThresholdCheck {
        met: details.is_empty(),
        details,
    }
}
