//! Exploration orchestrator - the main control loop
//!
//! One orchestrator drives one page through the application:
//! - pops the next URL from the frontier
//! - gates it through the scope
//! - navigates and waits for the page to settle
//! - extracts and fingerprints the document
//! - suppresses cycles, records new states as nodes
//! - links the new node to what it points at and queues new URLs
//!
//! The loop stops on the first of: page budget reached, time budget spent,
//! frontier exhausted, coverage thresholds met, or cancellation requested.

use crate::analysis::PageAnalyzer;
use crate::browser::BrowserEngine;
use crate::config::ExplorationConfig;
use crate::coverage::{calculate_coverage, check_thresholds, CoverageMetrics};
use crate::crawler::frontier::{pop, QueuedUrl};
use crate::cycle::{
    compute_fingerprint, create_cycle_report, detect_cycle, detect_infinite_scroll,
    pagination_key, CycleEntry, CycleReport,
};
use crate::graph::{ActionType, AppEdge, AppGraph, AppNode};
use crate::journey::{identify_journeys, UserJourney};
use crate::scope::CompiledScope;
use crate::spa::{detect_spa_navigation, SpaOptions};
use crate::state::{ExplorationState, PendingEdge, VisitOutcome};
use crate::url::{base_domain, normalize_url};
use crate::DiscoveryError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Lifecycle of an orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorStatus {
    Idle,
    Exploring,
    Completed,
}

/// Why an exploration stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationReason {
    MaxPages,
    Timeout,
    QueueExhausted,
    CoverageMet,
    Cancelled,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxPages => "max-pages",
            Self::Timeout => "timeout",
            Self::QueueExhausted => "queue-exhausted",
            Self::CoverageMet => "coverage-met",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot handed to the progress callback after every dequeued URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInfo {
    pub pages_discovered: usize,
    pub pages_visited: usize,
    pub pages_remaining: usize,
    pub elements_activated: usize,
    pub elapsed_ms: u64,
}

pub type ProgressCallback = Box<dyn Fn(&ProgressInfo) + Send + Sync>;

/// Everything an exploration produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationResult {
    /// The completed graph
    pub graph: AppGraph,
    pub coverage: CoverageMetrics,
    pub journeys: Vec<UserJourney>,
    pub cycle_report: CycleReport,
    pub skipped_urls: usize,
    /// Skipped URLs per visit outcome
    pub skip_reasons: BTreeMap<String, usize>,
    /// Edges whose target page was never visited; not part of `graph`
    pub unresolved_edges: usize,
    pub termination: TerminationReason,
}

/// Drives one exploration over a caller-owned page
pub struct Orchestrator<'a, E: BrowserEngine, A: PageAnalyzer<E>> {
    config: ExplorationConfig,
    engine: &'a E,
    page: &'a E::Page,
    analyzer: &'a A,
    scope: CompiledScope,
    base_domain: String,
    spa_options: SpaOptions,
    status: OrchestratorStatus,
    progress: Option<ProgressCallback>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a, E: BrowserEngine, A: PageAnalyzer<E>> Orchestrator<'a, E, A> {
    /// Creates an idle orchestrator
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(DiscoveryError::InvalidScope)` - A scope pattern does not compile
    /// * `Err(DiscoveryError::InvalidStartUrl)` - The start URL has no usable host
    pub fn new(
        config: &ExplorationConfig,
        engine: &'a E,
        page: &'a E::Page,
        analyzer: &'a A,
    ) -> Result<Self, DiscoveryError> {
        let scope = CompiledScope::compile(&config.scope).map_err(DiscoveryError::InvalidScope)?;
        let base_domain = base_domain(&config.start_url)
            .ok_or_else(|| DiscoveryError::InvalidStartUrl(config.start_url.clone()))?;

        Ok(Self {
            config: config.clone(),
            engine,
            page,
            analyzer,
            scope,
            base_domain,
            spa_options: config.spa_options.clone().unwrap_or_default(),
            status: OrchestratorStatus::Idle,
            progress: None,
            cancel: None,
        })
    }

    /// Registers a callback invoked after every dequeued URL
    pub fn with_progress(
        mut self,
        callback: impl Fn(&ProgressInfo) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Stops the loop at the next iteration once `flag` is set
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn status(&self) -> OrchestratorStatus {
        self.status
    }

    /// Runs the loop over `state` until a termination condition holds
    ///
    /// The state keeps its open graph and all bookkeeping so it can be
    /// serialized and resumed; the result carries a completed copy.
    pub async fn run(&mut self, state: &mut ExplorationState) -> ExplorationResult {
        self.status = OrchestratorStatus::Exploring;
        let started = Instant::now();
        let timeout = Duration::from_millis(self.config.timeout_ms);

        info!(
            "Exploring {} ({}, max {} pages, {} queued)",
            self.config.start_url,
            self.config.strategy,
            self.config.max_pages,
            state.pages_remaining()
        );

        let termination = loop {
            if self.is_cancelled() {
                break TerminationReason::Cancelled;
            }

            if state.graph.node_count() >= self.config.max_pages {
                break TerminationReason::MaxPages;
            }

            if started.elapsed() >= timeout {
                break TerminationReason::Timeout;
            }

            let Some(item) = pop(&mut state.queue, self.config.strategy) else {
                break TerminationReason::QueueExhausted;
            };

            let outcome = self.visit(state, &item).await;
            debug!("{} -> {}", item.url, outcome);
            state.record_skip(outcome);

            self.report_progress(state, started);

            if outcome.is_success() && self.coverage_met(state) {
                break TerminationReason::CoverageMet;
            }
        };

        let result = self.finish(state, termination);
        self.status = OrchestratorStatus::Completed;

        info!(
            "Exploration finished ({}): {} nodes, {} edges, {} cycles, {} skipped in {:?}",
            termination,
            result.graph.node_count(),
            result.graph.edge_count(),
            result.cycle_report.total_cycles_detected,
            result.skipped_urls,
            started.elapsed()
        );

        result
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Processes one dequeued URL
    async fn visit(&self, state: &mut ExplorationState, item: &QueuedUrl) -> VisitOutcome {
        let url = item.url.as_str();

        let decision = self.scope.is_url_allowed(url, &self.base_domain);
        if !decision.allowed {
            debug!("Out of scope: {} ({})", url, decision.reason.unwrap_or_default());
            return VisitOutcome::OutOfScope;
        }

        let engine = self.engine;
        let page = self.page;
        let navigation = detect_spa_navigation(engine, page, &self.spa_options, || {
            engine.navigate(page, url)
        })
        .await;
        let navigation = match navigation {
            Ok(navigation) => navigation,
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                return VisitOutcome::NavigationFailed;
            }
        };

        let status = navigation.outcome.status;
        if navigation.outcome.is_error_status() {
            warn!("Skipping {}: HTTP {}", url, status.unwrap_or_default());
            return VisitOutcome::ErrorStatus;
        }

        if !navigation.readiness.stable {
            debug!("{} did not settle within {:?}", url, navigation.readiness.waited);
        }

        let dom = match self.analyzer.extract_dom(engine, page).await {
            Ok(dom) => dom,
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                return VisitOutcome::ExtractionFailed;
            }
        };

        let final_url = navigation.new_url;
        let requested = normalize_url(url);
        let normalized = normalize_url(&final_url);
        let dom_hash = self.analyzer.hash_dom_content(&dom);
        let fingerprint = compute_fingerprint(&normalized, &dom_hash);
        let key = fingerprint.key();

        let cycle = detect_cycle(
            &fingerprint,
            &state.visited_fingerprints,
            &state.url_visit_counts,
            &self.config.cycle_config,
        )
        .or_else(|| {
            detect_infinite_scroll(
                &fingerprint,
                &state.pagination_counts,
                &self.config.cycle_config,
            )
        });

        if let Some(reason) = cycle {
            let existing = state
                .state_nodes
                .get(&key)
                .or_else(|| state.url_nodes.get(&normalized))
                .cloned();
            if let Some(target_id) = existing {
                self.resolve_pending(state, &[&requested, &normalized], &target_id, status);
            }

            let count = 1 + state
                .cycle_entries
                .iter()
                .filter(|entry| entry.fingerprint.normalized_url == normalized)
                .count() as u32;
            debug!("Cycle at {}: {} (#{})", url, reason, count);

            state.cycle_entries.push(CycleEntry {
                url: url.to_string(),
                fingerprint,
                reason,
                count,
                detected_at: Utc::now(),
            });
            return VisitOutcome::Cycle;
        }

        state.visited_fingerprints.insert(key.clone());
        *state.url_visit_counts.entry(normalized.clone()).or_default() += 1;
        if let Some(pagination) = pagination_key(&normalized) {
            *state.pagination_counts.entry(pagination).or_default() += 1;
        }

        let elements = self.analyzer.classify_interactive_elements(&dom);
        let forms = self.analyzer.detect_forms(&dom);

        let node_id = state.next_node_id();
        let screenshot_path = match engine.screenshot(page, &node_id).await {
            Ok(path) => path,
            Err(e) => {
                warn!("Screenshot failed for {}: {}", url, e);
                None
            }
        };

        state.add_node(AppNode {
            id: node_id.clone(),
            url: final_url,
            title: dom.title.clone(),
            element_count: elements.len(),
            discovery_timestamp: Utc::now(),
            dom_hash,
            screenshot_path,
        });
        info!("Recorded {} ({}) as {}", url, dom.title, node_id);

        state.state_nodes.insert(key, node_id.clone());
        for known in [&requested, &normalized] {
            state.url_nodes.entry(known.clone()).or_insert_with(|| node_id.clone());
            if let Some(code) = status {
                state.url_statuses.entry(known.clone()).or_insert(code);
            }
        }
        self.resolve_pending(state, &[&requested, &normalized], &node_id, status);

        state.total_elements_found += elements.len() + forms.len();

        let child_depth = item.depth + 1;
        let links = elements
            .iter()
            .filter_map(|e| e.target_url.as_ref().map(|t| (e.action_type(), &e.selector, t)))
            .chain(forms.iter().filter_map(|f| {
                f.action_url
                    .as_ref()
                    .map(|t| (ActionType::FormSubmit, &f.selector, t))
            }));

        for (action_type, selector, target) in links {
            self.link(state, &node_id, action_type, selector, target, child_depth);
        }

        VisitOutcome::Recorded
    }

    /// Connects a recorded node to one navigable element's target
    fn link(
        &self,
        state: &mut ExplorationState,
        source_id: &str,
        action_type: ActionType,
        selector: &str,
        target: &str,
        depth: u32,
    ) {
        if !self.scope.is_url_allowed(target, &self.base_domain).allowed {
            trace!("Not following {} from {}", target, source_id);
            return;
        }

        let within_depth = self.config.max_depth.map_or(true, |max| depth <= max);
        let target_url = normalize_url(target);

        if let Some(target_id) = state.url_nodes.get(&target_url).cloned() {
            let http_status = state.url_statuses.get(&target_url).copied();
            state.add_edge(AppEdge {
                source_id: source_id.to_string(),
                target_id,
                action_type,
                selector: selector.to_string(),
                http_status,
            });
        } else if within_depth || state.is_discovered(target) {
            state.pending_edges.push(PendingEdge {
                source_id: source_id.to_string(),
                target_url,
                action_type,
                selector: selector.to_string(),
            });
            if within_depth && state.enqueue(target, depth) {
                trace!("Queued {} at depth {}", target, depth);
            }
        } else {
            trace!("Not following {}: beyond max depth", target);
            return;
        }

        state
            .activated_element_ids
            .insert(format!("{}|{}", source_id, selector));
    }

    /// Turns pending edges aimed at any of `urls` into graph edges
    fn resolve_pending(
        &self,
        state: &mut ExplorationState,
        urls: &[&String],
        target_id: &str,
        status: Option<u16>,
    ) {
        let mut resolved = Vec::new();
        for (i, url) in urls.iter().enumerate() {
            if urls[..i].contains(url) {
                continue;
            }
            resolved.extend(state.take_pending(url));
        }

        for pending in resolved {
            state.add_edge(pending.resolve(target_id, status));
        }
    }

    fn coverage_met(&self, state: &ExplorationState) -> bool {
        let Some(thresholds) = &self.config.coverage_thresholds else {
            return false;
        };
        if thresholds.is_empty() {
            return false;
        }

        let check = check_thresholds(&compute_coverage(state), thresholds);
        if check.met {
            info!("Coverage thresholds met");
        }
        check.met
    }

    fn report_progress(&self, state: &ExplorationState, started: Instant) {
        let info = ProgressInfo {
            pages_discovered: state.discovered_urls.len(),
            pages_visited: state.graph.node_count(),
            pages_remaining: state.pages_remaining(),
            elements_activated: state.activated_element_ids.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        if info.pages_visited > 0 && info.pages_visited % 10 == 0 {
            info!(
                "Progress: {} visited, {} queued, {} elements activated",
                info.pages_visited, info.pages_remaining, info.elements_activated
            );
        }

        if let Some(callback) = &self.progress {
            callback(&info);
        }
    }

    fn finish(
        &self,
        state: &ExplorationState,
        termination: TerminationReason,
    ) -> ExplorationResult {
        if !state.pending_edges.is_empty() {
            debug!("{} edges left without a visited target", state.pending_edges.len());
        }

        ExplorationResult {
            graph: state.graph.clone().complete(),
            coverage: compute_coverage(state),
            journeys: identify_journeys(&state.graph),
            cycle_report: create_cycle_report(&state.cycle_entries),
            skipped_urls: state.skipped_urls,
            skip_reasons: state.skip_reasons.clone(),
            unresolved_edges: state.pending_edges.len(),
            termination,
        }
    }
}

/// Coverage of the current state
///
/// - pages: recorded nodes out of nodes plus URLs still queued
/// - elements: activated navigable elements out of all elements found
/// - paths: graph edges out of edges plus edges still pending
pub fn compute_coverage(state: &ExplorationState) -> CoverageMetrics {
    let nodes = state.graph.node_count();
    let edges = state.graph.edge_count();

    calculate_coverage(
        nodes,
        nodes + state.pages_remaining(),
        state.activated_element_ids.len(),
        state.total_elements_found,
        edges,
        edges + state.pending_edges.len(),
    )
}
