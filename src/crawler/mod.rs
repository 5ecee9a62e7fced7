//! Crawler module for driving an exploration
//!
//! This module contains the exploration control loop, including:
//! - The frontier and its pop order (breadth-first or depth-first)
//! - The orchestrator composing scope, readiness, fingerprinting, cycle
//!   detection and graph construction
//! - Final coverage, journey and cycle reporting

mod frontier;
mod orchestrator;

pub use frontier::{pop, ExplorationStrategy, QueuedUrl};
pub use orchestrator::{
    compute_coverage, ExplorationResult, Orchestrator, OrchestratorStatus, ProgressCallback,
    ProgressInfo, TerminationReason,
};

use crate::analysis::PageAnalyzer;
use crate::browser::BrowserEngine;
use crate::config::ExplorationConfig;
use crate::state::ExplorationState;
use crate::DiscoveryError;

/// Runs a complete exploration from the configured start URL
///
/// This is the main entry point. It will:
/// 1. Compile the scope and derive the base domain
/// 2. Queue the start URL
/// 3. Visit pages until a termination condition holds
/// 4. Compute coverage, journeys and the cycle report
///
/// # Arguments
///
/// * `config` - The exploration configuration
/// * `engine` - Browser collaborator driving `page`
/// * `page` - Page handle owned by the caller
/// * `analyzer` - Analysis collaborator
///
/// # Returns
///
/// * `Ok(ExplorationResult)` - Exploration finished
/// * `Err(DiscoveryError)` - The configuration could not be used
///
/// # Example
///
/// ```no_run
/// use discovery_engine::analysis::HtmlAnalyzer;
/// use discovery_engine::browser::{HttpBrowser, HttpPage};
/// use discovery_engine::config::ExplorationConfig;
/// use discovery_engine::crawler::explore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExplorationConfig::new("https://example.com/");
/// let browser = HttpBrowser::new(&config.http)?;
/// let page = HttpPage::new();
/// let result = explore(&config, &browser, &page, &HtmlAnalyzer::new()).await?;
/// println!("{} pages", result.graph.node_count());
/// # Ok(())
/// # }
/// ```
pub async fn explore<E, A>(
    config: &ExplorationConfig,
    engine: &E,
    page: &E::Page,
    analyzer: &A,
) -> Result<ExplorationResult, DiscoveryError>
where
    E: BrowserEngine,
    A: PageAnalyzer<E>,
{
    let mut state = ExplorationState::new(&config.start_url);
    explore_from_state(config, engine, page, analyzer, &mut state).await
}

/// Continues an exploration from a previously saved state
///
/// The state is updated in place and can be serialized again afterwards.
pub async fn explore_from_state<E, A>(
    config: &ExplorationConfig,
    engine: &E,
    page: &E::Page,
    analyzer: &A,
    state: &mut ExplorationState,
) -> Result<ExplorationResult, DiscoveryError>
where
    E: BrowserEngine,
    A: PageAnalyzer<E>,
{
    let mut orchestrator = Orchestrator::new(config, engine, page, analyzer)?;
    Ok(orchestrator.run(state).await)
}
