use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of user action an edge represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    /// Clicking a button or other clickable element
    Click,
    /// Submitting a form
    FormSubmit,
    /// Following a link
    Navigation,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::FormSubmit => "form-submit",
            Self::Navigation => "navigation",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "click" => Some(Self::Click),
            "form-submit" => Some(Self::FormSubmit),
            "navigation" => Some(Self::Navigation),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One distinct visited page state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppNode {
    pub id: String,
    pub url: String,
    pub title: String,
    pub element_count: usize,
    pub discovery_timestamp: DateTime<Utc>,
    pub dom_hash: String,
    pub screenshot_path: Option<String>,
}

impl AppNode {
    /// Title when present, otherwise the URL
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

/// One action taken from a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEdge {
    pub source_id: String,
    pub target_id: String,
    pub action_type: ActionType,
    pub selector: String,
    pub http_status: Option<u16>,
}

/// Run metadata carried by the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    pub start_url: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Directed graph of discovered page states and the actions between them
///
/// The graph is a value: `add_node`, `add_edge` and `complete` consume the
/// graph and hand back the extended one, so nothing is ever changed behind a
/// holder's back. Keep a clone when an older snapshot is needed.
///
/// `Default` is an empty placeholder stamped at the Unix epoch; use `new`
/// for a real run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppGraph {
    pub nodes: Vec<AppNode>,
    pub edges: Vec<AppEdge>,
    pub metadata: GraphMetadata,
}

impl AppGraph {
    /// Creates an empty graph stamped with the current time
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: GraphMetadata {
                start_url: start_url.into(),
                started_at: Utc::now(),
                completed_at: None,
            },
        }
    }

    /// Returns the graph with `node` appended
    #[must_use]
    pub fn add_node(mut self, node: AppNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Returns the graph with `edge` appended
    ///
    /// Callers are responsible for only adding edges whose endpoints exist;
    /// `dangling_edges` reports any that slipped through.
    #[must_use]
    pub fn add_edge(mut self, edge: AppEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Returns the graph with `completedAt` set to now
    #[must_use]
    pub fn complete(mut self) -> Self {
        self.metadata.completed_at = Some(Utc::now());
        self
    }

    pub fn is_complete(&self) -> bool {
        self.metadata.completed_at.is_some()
    }

    /// Looks up a node by id
    pub fn get_node(&self, id: &str) -> Option<&AppNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }

    /// Outgoing edges of a node in insertion order
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a AppEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.source_id == id)
    }

    /// Edges whose source or target does not name a node in this graph
    pub fn dangling_edges(&self) -> Vec<&AppEdge> {
        self.edges
            .iter()
            .filter(|edge| {
                !self.contains_node(&edge.source_id) || !self.contains_node(&edge.target_id)
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Serializes the graph to a JSON document
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Restores a graph from a JSON document produced by `to_json`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
