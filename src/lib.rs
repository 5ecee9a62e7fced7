//! Discovery Engine: autonomous web application explorer
//!
//! This crate drives a single browser page through a web application, builds a
//! graph of the page states it reaches and the actions linking them, stays
//! inside a configured URL boundary, suppresses cyclic revisits, measures
//! coverage, and classifies recurring edge sequences into user journeys.

pub mod analysis;
pub mod browser;
pub mod config;
pub mod coverage;
pub mod crawler;
pub mod cycle;
pub mod graph;
pub mod journey;
pub mod output;
pub mod scope;
pub mod spa;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Discovery Engine operations
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid scope configuration: {}", .0.join("; "))]
    InvalidScope(Vec<String>),

    #[error("Invalid start URL: {0}")]
    InvalidStartUrl(String),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] analysis::AnalysisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported exploration state version {found} (expected {expected})")]
    StateVersion { found: u32, expected: u32 },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid scope pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Discovery Engine operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::ExplorationConfig;
pub use crawler::{explore, ExplorationResult, Orchestrator};
pub use graph::{ActionType, AppEdge, AppGraph, AppNode};
pub use state::ExplorationState;
