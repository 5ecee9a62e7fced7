//! Statistics derived from an exploration result
//!
//! This module turns an `ExplorationResult` into an `ExplorationSummary`
//! and prints it for the terminal.

use crate::crawler::{ExplorationResult, ExplorationStrategy};
use crate::output::traits::ExplorationSummary;
use std::collections::BTreeMap;

/// Builds summary statistics from a finished exploration
///
/// # Arguments
///
/// * `result` - The finished exploration
/// * `strategy` - Frontier order the exploration used
/// * `config_hash` - Hash of the configuration file, if known
///
/// # Returns
///
/// An `ExplorationSummary` with all breakdowns filled in
pub fn summarize(
    result: &ExplorationResult,
    strategy: ExplorationStrategy,
    config_hash: Option<&str>,
) -> ExplorationSummary {
    let metadata = &result.graph.metadata;

    let duration_seconds = metadata
        .completed_at
        .map(|completed| (completed - metadata.started_at).num_seconds());

    let mut edges_by_action = BTreeMap::new();
    for edge in &result.graph.edges {
        *edges_by_action
            .entry(edge.action_type.as_str().to_string())
            .or_default() += 1;
    }

    let mut journeys_by_type = BTreeMap::new();
    for journey in &result.journeys {
        *journeys_by_type
            .entry(journey.journey_type.as_str().to_string())
            .or_default() += 1;
    }

    let mut cycles_by_reason = BTreeMap::new();
    for entry in &result.cycle_report.entries {
        *cycles_by_reason
            .entry(entry.reason.as_str().to_string())
            .or_default() += 1;
    }

    ExplorationSummary {
        start_url: metadata.start_url.clone(),
        strategy: strategy.as_str().to_string(),
        config_hash: config_hash.map(str::to_string),
        started_at: metadata.started_at.to_rfc3339(),
        completed_at: metadata.completed_at.map(|c| c.to_rfc3339()),
        duration_seconds,
        termination: result.termination.as_str().to_string(),
        total_nodes: result.graph.node_count(),
        total_edges: result.graph.edge_count(),
        total_journeys: result.journeys.len(),
        total_cycles: result.cycle_report.total_cycles_detected,
        skipped_urls: result.skipped_urls,
        unresolved_edges: result.unresolved_edges,
        coverage: result.coverage,
        edges_by_action,
        journeys_by_type,
        cycles_by_reason,
        skip_reasons: result.skip_reasons.clone(),
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The statistics to display
pub fn print_statistics(summary: &ExplorationSummary) {
    println!("=== Exploration Statistics ===\n");

    println!("Overview:");
    println!("  Start URL: {}", summary.start_url);
    println!("  Stopped because: {}", summary.termination);
    println!("  Page states: {}", summary.total_nodes);
    println!("  Transitions: {}", summary.total_edges);
    println!("  Journeys: {}", summary.total_journeys);
    println!("  Cycles suppressed: {}", summary.total_cycles);
    println!("  Skipped URLs: {}", summary.skipped_urls);
    println!("  Unresolved edges: {}", summary.unresolved_edges);
    println!();

    println!("Coverage:");
    for (label, ratio) in [
        ("Pages", &summary.coverage.page_coverage),
        ("Elements", &summary.coverage.element_coverage),
        ("Paths", &summary.coverage.path_coverage),
    ] {
        println!(
            "  {}: {:.1}% ({} / {})",
            label, ratio.percentage, ratio.covered, ratio.total
        );
    }
    println!();

    if !summary.edges_by_action.is_empty() {
        println!("Transitions by Action:");
        for (action, count) in &summary.edges_by_action {
            println!("  {}: {}", action, count);
        }
        println!();
    }

    if !summary.skip_reasons.is_empty() {
        println!("Skipped URLs by Reason:");
        // Sort reasons by count (descending)
        let mut reasons: Vec<_> = summary.skip_reasons.iter().collect();
        reasons.sort_by(|a, b| b.1.cmp(a.1));

        for (reason, count) in reasons {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    println!(
        "Yield: {:.1}% ({} / {} dequeued URLs became new page states)",
        summary.yield_rate(),
        summary.total_nodes,
        summary.total_dequeued()
    );
}
