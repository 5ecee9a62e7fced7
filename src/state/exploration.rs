use super::VisitOutcome;
use crate::crawler::QueuedUrl;
use crate::cycle::CycleEntry;
use crate::graph::{ActionType, AppEdge, AppGraph, AppNode};
use crate::DiscoveryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Version written into every serialized state
pub const STATE_VERSION: u32 = 1;

/// An edge whose target page has not been visited yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEdge {
    pub source_id: String,
    /// Normalized URL of the target
    pub target_url: String,
    pub action_type: ActionType,
    pub selector: String,
}

impl PendingEdge {
    /// Turns the pending edge into a graph edge pointing at `target_id`
    pub fn resolve(self, target_id: &str, http_status: Option<u16>) -> AppEdge {
        AppEdge {
            source_id: self.source_id,
            target_id: target_id.to_string(),
            action_type: self.action_type,
            selector: self.selector,
            http_status,
        }
    }
}

/// Everything an in-flight exploration knows, resumable after a restart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationState {
    pub version: u32,

    /// Hash of the configuration the state was produced with
    #[serde(default)]
    pub config_hash: Option<String>,

    pub queue: VecDeque<QueuedUrl>,

    /// Fingerprint keys of every accepted page state
    pub visited_fingerprints: HashSet<String>,

    pub graph: AppGraph,

    pub activated_element_ids: HashSet<String>,
    pub total_elements_found: usize,
    pub started_at: DateTime<Utc>,

    /// Accepted states per normalized URL
    #[serde(default)]
    pub url_visit_counts: HashMap<String, u32>,

    /// Accepted states per pagination key
    #[serde(default)]
    pub pagination_counts: HashMap<String, u32>,

    /// Fingerprint key → node id
    #[serde(default)]
    pub state_nodes: HashMap<String, String>,

    /// Normalized URL → id of the first node recorded for it
    #[serde(default)]
    pub url_nodes: HashMap<String, String>,

    /// Normalized URL → HTTP status of the navigation that recorded it
    #[serde(default)]
    pub url_statuses: HashMap<String, u16>,

    #[serde(default)]
    pub pending_edges: Vec<PendingEdge>,

    /// Every raw URL ever queued
    #[serde(default)]
    pub discovered_urls: HashSet<String>,

    #[serde(default)]
    pub cycle_entries: Vec<CycleEntry>,

    #[serde(default)]
    pub skipped_urls: usize,

    /// Skipped URLs per outcome
    #[serde(default)]
    pub skip_reasons: BTreeMap<String, usize>,
}

impl ExplorationState {
    /// Fresh state with only the start URL queued
    pub fn new(start_url: &str) -> Self {
        let mut state = Self {
            version: STATE_VERSION,
            config_hash: None,
            queue: VecDeque::new(),
            visited_fingerprints: HashSet::new(),
            graph: AppGraph::new(start_url),
            activated_element_ids: HashSet::new(),
            total_elements_found: 0,
            started_at: Utc::now(),
            url_visit_counts: HashMap::new(),
            pagination_counts: HashMap::new(),
            state_nodes: HashMap::new(),
            url_nodes: HashMap::new(),
            url_statuses: HashMap::new(),
            pending_edges: Vec::new(),
            discovered_urls: HashSet::new(),
            cycle_entries: Vec::new(),
            skipped_urls: 0,
            skip_reasons: BTreeMap::new(),
        };
        state.enqueue(start_url, 0);
        state
    }

    /// Queues `url` unless it was queued before
    ///
    /// # Returns
    ///
    /// `true` if the URL was added to the queue
    pub fn enqueue(&mut self, url: &str, depth: u32) -> bool {
        if !self.discovered_urls.insert(url.to_string()) {
            return false;
        }
        self.queue.push_back(QueuedUrl::new(url, depth));
        true
    }

    pub fn is_discovered(&self, url: &str) -> bool {
        self.discovered_urls.contains(url)
    }

    pub fn pages_remaining(&self) -> usize {
        self.queue.len()
    }

    /// Id for the next node added to the graph
    pub fn next_node_id(&self) -> String {
        format!("node-{}", self.graph.node_count() + 1)
    }

    /// Counts a skipped URL under its outcome
    pub fn record_skip(&mut self, outcome: VisitOutcome) {
        if outcome.is_skip() {
            self.skipped_urls += 1;
            *self.skip_reasons.entry(outcome.as_str().to_string()).or_default() += 1;
        }
    }

    /// Appends a node to the graph
    pub fn add_node(&mut self, node: AppNode) {
        let graph = std::mem::take(&mut self.graph);
        self.graph = graph.add_node(node);
    }

    /// Appends an edge to the graph
    pub fn add_edge(&mut self, edge: AppEdge) {
        let graph = std::mem::take(&mut self.graph);
        self.graph = graph.add_edge(edge);
    }

    /// Removes and returns every pending edge aimed at `normalized_url`
    pub fn take_pending(&mut self, normalized_url: &str) -> Vec<PendingEdge> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_edges)
            .into_iter()
            .partition(|edge| edge.target_url == normalized_url);
        self.pending_edges = rest;
        matching
    }
}

/// Serializes a state to a JSON document
pub fn serialize_exploration_state(state: &ExplorationState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(state)
}

/// Restores a state produced by `serialize_exploration_state`
///
/// # Returns
///
/// * `Ok(ExplorationState)` - The restored state
/// * `Err(DiscoveryError::Serialization)` - Malformed document
/// * `Err(DiscoveryError::StateVersion)` - Written by an incompatible version
pub fn deserialize_exploration_state(json: &str) -> crate::Result<ExplorationState> {
    let state: ExplorationState = serde_json::from_str(json)?;

    if state.version != STATE_VERSION {
        return Err(DiscoveryError::StateVersion {
            found: state.version,
            expected: STATE_VERSION,
        });
    }

    Ok(state)
}
