use crate::coverage::CoverageThresholds;
use crate::crawler::ExplorationStrategy;
use crate::cycle::CycleConfig;
use crate::scope::ScopeConfig;
use crate::spa::SpaOptions;
use serde::{Deserialize, Serialize};

/// Main configuration structure for an exploration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// URL the exploration starts from
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Maximum number of page states to record
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Wall-clock budget for the whole exploration (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Queue pop order
    #[serde(default)]
    pub strategy: ExplorationStrategy,

    /// Maximum link depth from the start URL (unbounded when absent)
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<u32>,

    #[serde(default)]
    pub scope: ScopeConfig,

    #[serde(rename = "cycle", default)]
    pub cycle_config: CycleConfig,

    #[serde(rename = "spa", default)]
    pub spa_options: Option<SpaOptions>,

    #[serde(rename = "coverage", default)]
    pub coverage_thresholds: Option<CoverageThresholds>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl ExplorationConfig {
    /// Creates a configuration with defaults for everything but the start URL
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            max_pages: default_max_pages(),
            timeout_ms: default_timeout_ms(),
            strategy: ExplorationStrategy::default(),
            max_depth: None,
            scope: ScopeConfig::default(),
            cycle_config: CycleConfig::default(),
            spa_options: None,
            coverage_thresholds: None,
            http: HttpConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Settings for the built-in HTTP browser collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Output locations; every entry is optional and can be overridden on the command line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the resumable exploration state (JSON)
    #[serde(rename = "state-path", default)]
    pub state_path: Option<String>,

    /// Path of the final graph document (JSON)
    #[serde(rename = "graph-path", default)]
    pub graph_path: Option<String>,

    /// Path of the markdown summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,

    /// Path of the SQLite graph export
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

fn default_max_pages() -> usize {
    100
}

fn default_timeout_ms() -> u64 {
    300_000
}

fn default_user_agent() -> String {
    format!("DiscoveryEngine/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout_ms() -> u64 {
    30_000
}
