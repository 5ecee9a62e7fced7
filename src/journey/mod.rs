//! User journey identification
//!
//! Heuristics that group graph edges into named flows:
//! - **authentication**: a form submitted on a login page that leads away from it
//! - **form-submission**: any other form submitted from a non-login page
//! - **content-navigation**: a chain of link follows through pages that each
//!   offer exactly one way forward
//!
//! A login page is one whose URL or title contains a login token such as
//! `login`, `signin` or `auth`.

use crate::graph::{ActionType, AppEdge, AppGraph, AppNode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Substrings marking a page as a login page
pub const LOGIN_TOKENS: &[&str] = &["login", "log-in", "signin", "sign-in", "sign_in", "auth"];

/// Minimum number of steps in a content-navigation journey
const MIN_CHAIN_STEPS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JourneyType {
    Authentication,
    FormSubmission,
    ContentNavigation,
    Custom,
}

impl JourneyType {
    /// Human-readable label used in journey names
    pub fn label(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication",
            Self::FormSubmission => "Form Submission",
            Self::ContentNavigation => "Content Navigation",
            Self::Custom => "Custom",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::FormSubmission => "form-submission",
            Self::ContentNavigation => "content-navigation",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for JourneyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named sequence of edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJourney {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub journey_type: JourneyType,
    pub steps: Vec<AppEdge>,
    pub entry_node_id: String,
    pub exit_node_id: String,
}

/// True when the node's URL or title contains a login token
pub fn is_login_page(node: &AppNode) -> bool {
    let url = node.url.to_lowercase();
    let title = node.title.to_lowercase();
    LOGIN_TOKENS
        .iter()
        .any(|token| url.contains(token) || title.contains(token))
}

fn node_is_login(graph: &AppGraph, id: &str) -> bool {
    graph.get_node(id).map(is_login_page).unwrap_or(false)
}

/// Classifies a sequence of steps
///
/// Precedence: authentication, then form-submission, then
/// content-navigation; empty or non-matching sequences are custom.
pub fn classify_journey_type(steps: &[AppEdge], graph: &AppGraph) -> JourneyType {
    if steps.is_empty() {
        return JourneyType::Custom;
    }

    let submits = || steps.iter().filter(|e| e.action_type == ActionType::FormSubmit);

    let leaves_login =
        |e: &&AppEdge| node_is_login(graph, &e.source_id) && !node_is_login(graph, &e.target_id);
    if submits().any(|e| leaves_login(&e)) {
        return JourneyType::Authentication;
    }

    if submits().any(|e| !node_is_login(graph, &e.source_id)) {
        return JourneyType::FormSubmission;
    }

    let all_navigation = steps.iter().all(|e| e.action_type == ActionType::Navigation);
    let contiguous = steps.windows(2).all(|w| w[0].target_id == w[1].source_id);
    if all_navigation && contiguous && steps.len() >= MIN_CHAIN_STEPS {
        return JourneyType::ContentNavigation;
    }

    JourneyType::Custom
}

/// Renders `"<Type label>: <entry> → <exit>"` using titles where available
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use discovery_engine::graph::AppNode;
/// use discovery_engine::journey::{generate_journey_name, JourneyType};
///
/// let page = |id: &str, title: &str| AppNode {
///     id: id.to_string(),
///     url: format!("https://example.com/{}", id),
///     title: title.to_string(),
///     element_count: 0,
///     discovery_timestamp: Utc::now(),
///     dom_hash: String::new(),
///     screenshot_path: None,
/// };
///
/// let entry = page("login", "Sign in");
/// let name = generate_journey_name(JourneyType::Authentication, &entry, &page("home", ""));
/// assert_eq!(name, "Authentication: Sign in → https://example.com/home");
/// ```
pub fn generate_journey_name(journey_type: JourneyType, entry: &AppNode, exit: &AppNode) -> String {
    format!("{}: {} → {}", journey_type.label(), entry.label(), exit.label())
}

/// Finds every journey in a graph
///
/// Form journeys come first, in edge order, followed by content-navigation
/// chains in node order. Ids are `journey-1`, `journey-2`, ...
pub fn identify_journeys(graph: &AppGraph) -> Vec<UserJourney> {
    let mut candidates: Vec<Vec<AppEdge>> = graph
        .edges
        .iter()
        .filter(|e| e.action_type == ActionType::FormSubmit)
        .map(|e| vec![e.clone()])
        .collect();

    candidates.extend(navigation_chains(graph));

    let mut journeys = Vec::new();
    for steps in candidates {
        let journey_type = classify_journey_type(&steps, graph);
        if journey_type == JourneyType::Custom {
            continue;
        }

        let (Some(first), Some(last)) = (steps.first(), steps.last()) else {
            continue;
        };
        let entry = graph.get_node(&first.source_id);
        let exit = graph.get_node(&last.target_id);
        let (Some(entry), Some(exit)) = (entry, exit) else {
            continue;
        };

        journeys.push(UserJourney {
            id: format!("journey-{}", journeys.len() + 1),
            name: generate_journey_name(journey_type, entry, exit),
            journey_type,
            entry_node_id: entry.id.clone(),
            exit_node_id: exit.id.clone(),
            steps,
        });
    }

    journeys
}

/// Maximal navigation chains of at least two steps
///
/// Every node that takes a step along a chain has exactly one outgoing
/// navigation edge. A chain starts at such a node unless another such node
/// leads into it, since the chain through that predecessor already covers
/// it. Loops with no outside entry start at their first node in graph order.
/// A chain is cut before the first node it would revisit.
fn navigation_chains(graph: &AppGraph) -> Vec<Vec<AppEdge>> {
    let mut outgoing: HashMap<&str, Vec<&AppEdge>> = HashMap::new();
    for edge in &graph.edges {
        if edge.action_type != ActionType::Navigation || edge.source_id == edge.target_id {
            continue;
        }
        outgoing.entry(edge.source_id.as_str()).or_default().push(edge);
    }

    // Nodes entered from a single-exit node
    let continued: HashSet<&str> = graph
        .nodes
        .iter()
        .filter_map(|node| single_exit(&outgoing, &node.id))
        .map(|edge| edge.target_id.as_str())
        .collect();

    let mut covered: HashSet<&str> = HashSet::new();
    let mut chains = Vec::new();

    for node in &graph.nodes {
        let id = node.id.as_str();
        if single_exit(&outgoing, id).is_some() && !continued.contains(id) {
            chains.extend(walk_chain(&outgoing, id, &mut covered));
        }
    }

    // Whatever single-exit node is left sits on a closed loop
    for node in &graph.nodes {
        let id = node.id.as_str();
        if single_exit(&outgoing, id).is_some() && !covered.contains(id) {
            chains.extend(walk_chain(&outgoing, id, &mut covered));
        }
    }

    chains
}

fn single_exit<'g>(
    outgoing: &HashMap<&'g str, Vec<&'g AppEdge>>,
    id: &str,
) -> Option<&'g AppEdge> {
    match outgoing.get(id).map(Vec::as_slice) {
        Some([only]) => Some(*only),
        _ => None,
    }
}

/// Follows single exits from `start`, marking every node that steps as covered
fn walk_chain<'g>(
    outgoing: &HashMap<&'g str, Vec<&'g AppEdge>>,
    start: &'g str,
    covered: &mut HashSet<&'g str>,
) -> Option<Vec<AppEdge>> {
    let mut chain = Vec::new();
    let mut on_chain: HashSet<&str> = HashSet::from([start]);
    let mut current = start;

    while let Some(step) = single_exit(outgoing, current) {
        covered.insert(current);
        if !on_chain.insert(step.target_id.as_str()) {
            break;
        }
        chain.push(step.clone());
        current = step.target_id.as_str();
    }

    (chain.len() >= MIN_CHAIN_STEPS).then_some(chain)
}
