//! Cycle detection for page states
//!
//! A page state is identified by its fingerprint: the normalized URL plus a
//! hash of the rendered DOM. Three guards keep an exploration from looping:
//!
//! - **duplicate-state**: the exact fingerprint was already visited (for
//!   example an SPA view re-rendered under the same URL)
//! - **parameterized-url-limit**: the same normalized URL has produced too many
//!   distinct states (content that differs slightly on every load)
//! - **infinite-scroll**: too many states share one URL modulo its pagination
//!   parameters (`?page=1`, `?page=2`, ...)

mod report;

pub use report::{create_cycle_report, CycleEntry, CycleReport};

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use url::Url;

/// Query parameters treated as pagination when computing a pagination key
pub const PAGINATION_PARAMS: &[&str] = &["page", "p", "offset", "start", "cursor", "skip", "limit"];

/// Identity of a logical page state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFingerprint {
    pub normalized_url: String,
    pub dom_hash: String,
}

impl StateFingerprint {
    /// Deterministic lookup key: `normalizedUrl|domHash`
    pub fn key(&self) -> String {
        fingerprint_key(self)
    }
}

/// Builds the fingerprint of a page state
pub fn compute_fingerprint(normalized_url: &str, dom_hash: &str) -> StateFingerprint {
    StateFingerprint {
        normalized_url: normalized_url.to_string(),
        dom_hash: dom_hash.to_string(),
    }
}

/// Returns `normalizedUrl + "|" + domHash`
pub fn fingerprint_key(fingerprint: &StateFingerprint) -> String {
    format!("{}|{}", fingerprint.normalized_url, fingerprint.dom_hash)
}

/// Why a visit was suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CycleReason {
    DuplicateState,
    ParameterizedUrlLimit,
    InfiniteScroll,
}

impl CycleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateState => "duplicate-state",
            Self::ParameterizedUrlLimit => "parameterized-url-limit",
            Self::InfiniteScroll => "infinite-scroll",
        }
    }
}

impl fmt::Display for CycleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loop-detection thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Maximum number of distinct states recorded for one normalized URL
    #[serde(rename = "parameterized-url-limit", default = "default_parameterized_url_limit")]
    pub parameterized_url_limit: u32,

    /// Maximum number of states recorded for one URL modulo pagination parameters
    #[serde(rename = "infinite-scroll-threshold", default = "default_infinite_scroll_threshold")]
    pub infinite_scroll_threshold: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            parameterized_url_limit: default_parameterized_url_limit(),
            infinite_scroll_threshold: default_infinite_scroll_threshold(),
        }
    }
}

fn default_parameterized_url_limit() -> u32 {
    5
}

fn default_infinite_scroll_threshold() -> u32 {
    10
}

/// Decides whether visiting `fingerprint` would repeat known ground
///
/// Checks, in order:
/// 1. the fingerprint key is already visited → `DuplicateState`
/// 2. the normalized URL has been visited `parameterized_url_limit` times or
///    more → `ParameterizedUrlLimit`
///
/// Returns `None` when the state is new.
pub fn detect_cycle(
    fingerprint: &StateFingerprint,
    visited_keys: &HashSet<String>,
    url_visit_counts: &HashMap<String, u32>,
    config: &CycleConfig,
) -> Option<CycleReason> {
    if visited_keys.contains(&fingerprint_key(fingerprint)) {
        return Some(CycleReason::DuplicateState);
    }

    let visits = url_visit_counts
        .get(&fingerprint.normalized_url)
        .copied()
        .unwrap_or(0);
    if visits >= config.parameterized_url_limit {
        return Some(CycleReason::ParameterizedUrlLimit);
    }

    None
}

/// Reports `InfiniteScroll` once too many states share a pagination key
///
/// URLs without pagination parameters are never flagged.
pub fn detect_infinite_scroll(
    fingerprint: &StateFingerprint,
    pagination_counts: &HashMap<String, u32>,
    config: &CycleConfig,
) -> Option<CycleReason> {
    let key = pagination_key(&fingerprint.normalized_url)?;
    let seen = pagination_counts.get(&key).copied().unwrap_or(0);

    if seen >= config.infinite_scroll_threshold {
        Some(CycleReason::InfiniteScroll)
    } else {
        None
    }
}

/// The URL with its pagination parameters removed
///
/// Returns `None` if the URL carries no pagination parameter or cannot be parsed.
///
/// # Examples
///
/// ```
/// use discovery_engine::cycle::pagination_key;
///
/// assert_eq!(
///     pagination_key("https://example.com/feed?page=7&sort=new").as_deref(),
///     Some("https://example.com/feed?sort=new")
/// );
/// assert_eq!(pagination_key("https://example.com/feed?sort=new"), None);
/// ```
pub fn pagination_key(normalized_url: &str) -> Option<String> {
    let mut url = Url::parse(normalized_url).ok()?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let kept: Vec<&(String, String)> = pairs
        .iter()
        .filter(|(key, _)| !PAGINATION_PARAMS.contains(&key.to_ascii_lowercase().as_str()))
        .collect();

    if kept.len() == pairs.len() {
        return None;
    }

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    Some(url.to_string())
}
