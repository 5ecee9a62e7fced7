//! Discovery Engine main entry point
//!
//! This is the command-line interface for the Discovery Engine web
//! application explorer.

use anyhow::{bail, Context};
use clap::Parser;
use discovery_engine::analysis::HtmlAnalyzer;
use discovery_engine::browser::{HttpBrowser, HttpPage};
use discovery_engine::config::{load_config_with_hash, ExplorationConfig, OutputConfig};
use discovery_engine::crawler::Orchestrator;
use discovery_engine::output::{handlers_for, print_statistics, summarize, write_state_file};
use discovery_engine::scope::is_url_allowed;
use discovery_engine::state::{deserialize_exploration_state, ExplorationState};
use discovery_engine::url::base_domain;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Discovery Engine: an autonomous web application explorer
///
/// Discovery Engine walks a web application from a start URL, records every
/// distinct page state it reaches and the actions linking them, and reports
/// coverage, suppressed cycles and the user journeys it recognised.
#[derive(Parser, Debug)]
#[command(name = "discovery-engine")]
#[command(version)]
#[command(about = "An autonomous web application explorer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be explored without exploring
    #[arg(long)]
    dry_run: bool,

    /// Exploration state file (written on completion, read with --resume)
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,

    /// Continue from the saved exploration state
    #[arg(long, conflicts_with = "dry_run")]
    resume: bool,

    /// Write the final graph as JSON
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a markdown summary
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Export the graph to a SQLite database
    #[arg(long, value_name = "FILE")]
    sqlite: Option<PathBuf>,
}

impl Cli {
    /// Output locations from the config file, overridden by the command line
    fn output_config(&self, config: &OutputConfig) -> OutputConfig {
        let pick = |cli: &Option<PathBuf>, file: &Option<String>| {
            cli.as_ref()
                .map(|p| p.display().to_string())
                .or_else(|| file.clone())
        };

        OutputConfig {
            state_path: pick(&self.state, &config.state_path),
            graph_path: pick(&self.output, &config.graph_path),
            summary_path: pick(&self.summary, &config.summary_path),
            database_path: pick(&self.sqlite, &config.database_path),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let outputs = cli.output_config(&config.output);

    if cli.dry_run {
        handle_dry_run(&config, &outputs)
    } else {
        handle_explore(&config, &config_hash, &outputs, cli.resume, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("discovery_engine=info,warn"),
            1 => EnvFilter::new("discovery_engine=debug,info"),
            2 => EnvFilter::new("discovery_engine=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be explored
fn handle_dry_run(config: &ExplorationConfig, outputs: &OutputConfig) -> anyhow::Result<()> {
    println!("=== Discovery Engine Dry Run ===\n");

    println!("Exploration:");
    println!("  Start URL: {}", config.start_url);
    println!("  Strategy: {}", config.strategy);
    println!("  Max pages: {}", config.max_pages);
    println!("  Timeout: {}ms", config.timeout_ms);
    match config.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unbounded"),
    }

    println!("\nCycle Limits:");
    println!(
        "  Parameterized URL limit: {}",
        config.cycle_config.parameterized_url_limit
    );
    println!(
        "  Infinite scroll threshold: {}",
        config.cycle_config.infinite_scroll_threshold
    );

    let spa = config.spa_options.clone().unwrap_or_default();
    println!("\nReadiness:");
    println!("  Stability timeout: {}ms", spa.stability_timeout_ms);
    println!("  Quiet window: {}ms", spa.network_idle_timeout_ms);
    println!("  Poll interval: {}ms", spa.poll_interval_ms);

    if let Some(thresholds) = &config.coverage_thresholds {
        println!("\nCoverage Thresholds:");
        for (label, value) in [
            ("Pages", thresholds.page),
            ("Elements", thresholds.element),
            ("Paths", thresholds.path),
        ] {
            if let Some(value) = value {
                println!("  {}: {:.1}%", label, value);
            }
        }
    }

    println!("\nScope:");
    println!(
        "  External domains: {}",
        if config.scope.allow_external_domains {
            "allowed"
        } else {
            "denied"
        }
    );
    println!("  Allow patterns ({}):", config.scope.allow_patterns.len());
    for pattern in &config.scope.allow_patterns {
        println!("    - {}", pattern);
    }
    println!("  Deny patterns ({}):", config.scope.deny_patterns.len());
    for pattern in &config.scope.deny_patterns {
        println!("    - {}", pattern);
    }
    println!(
        "  Excluded query parameters ({}):",
        config.scope.exclude_query_patterns.len()
    );
    for pattern in &config.scope.exclude_query_patterns {
        println!("    - {}", pattern);
    }

    println!("\nOutput:");
    for (label, path) in [
        ("State", &outputs.state_path),
        ("Graph", &outputs.graph_path),
        ("Summary", &outputs.summary_path),
        ("Database", &outputs.database_path),
    ] {
        println!("  {}: {}", label, path.as_deref().unwrap_or("(none)"));
    }

    let domain = base_domain(&config.start_url)
        .with_context(|| format!("Start URL has no host: {}", config.start_url))?;
    let decision = is_url_allowed(&config.start_url, &config.scope, &domain);

    println!("\n✓ Configuration is valid");
    if decision.allowed {
        println!("✓ Would start exploring at {} (site: {})", config.start_url, domain);
    } else {
        println!(
            "✗ Start URL is outside the scope: {}",
            decision.reason.unwrap_or_default()
        );
    }

    Ok(())
}

/// Reads a saved state, or starts fresh when there is none
fn load_state(
    config: &ExplorationConfig,
    config_hash: &str,
    state_path: Option<&Path>,
    resume: bool,
) -> anyhow::Result<ExplorationState> {
    if !resume {
        return Ok(ExplorationState::new(&config.start_url));
    }

    let Some(path) = state_path else {
        bail!("--resume needs a state file (--state or output.state-path)");
    };

    if !path.exists() {
        tracing::warn!("No saved state at {}, starting fresh", path.display());
        return Ok(ExplorationState::new(&config.start_url));
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state from {}", path.display()))?;
    let state = deserialize_exploration_state(&json)
        .with_context(|| format!("Failed to restore state from {}", path.display()))?;

    if state.config_hash.as_deref() != Some(config_hash) {
        tracing::warn!("Configuration changed since the saved state was written");
    }

    tracing::info!(
        "Resuming: {} pages recorded, {} queued",
        state.graph.node_count(),
        state.pages_remaining()
    );
    Ok(state)
}

/// Handles the main exploration
async fn handle_explore(
    config: &ExplorationConfig,
    config_hash: &str,
    outputs: &OutputConfig,
    resume: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let state_path = outputs.state_path.as_deref().map(Path::new);
    let mut state = load_state(config, config_hash, state_path, resume)?;
    state.config_hash = Some(config_hash.to_string());

    let browser = HttpBrowser::new(&config.http).context("Failed to build HTTP client")?;
    let page = HttpPage::new();
    let analyzer = HtmlAnalyzer::new();

    // Stop at the next dequeue on Ctrl-C so state and outputs still get written
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, finishing the current page");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let mut orchestrator = Orchestrator::new(config, &browser, &page, &analyzer)?
        .with_cancellation(cancel)
        .with_progress(|progress| {
            tracing::debug!(
                "{} visited, {} queued, {} elements activated ({}ms)",
                progress.pages_visited,
                progress.pages_remaining,
                progress.elements_activated,
                progress.elapsed_ms
            );
        });

    let result = orchestrator.run(&mut state).await;

    if let Some(path) = state_path {
        write_state_file(&state, path)
            .with_context(|| format!("Failed to save state to {}", path.display()))?;
        tracing::info!("State saved to {}", path.display());
    }

    let summary = summarize(&result, config.strategy, Some(config_hash));
    for handler in handlers_for(outputs) {
        handler
            .write(&result, &summary)
            .with_context(|| format!("Failed to write {}", handler.name()))?;
        tracing::info!("Wrote {}", handler.name());
    }

    if !quiet {
        print_statistics(&summary);
    }

    Ok(())
}
