//! Output module for reporting finished explorations
//!
//! This module handles:
//! - Deriving summary statistics from an exploration result
//! - Generating markdown summaries
//! - Writing the graph as JSON and exporting it to SQLite
//! - Persisting resumable state snapshots

mod json;
mod markdown;
pub mod sqlite;
pub mod stats;
mod traits;

pub use json::{write_state_file, GraphJsonOutput};
pub use markdown::{format_markdown_summary, generate_markdown_summary, MarkdownOutput};
pub use sqlite::{export_exploration, SqliteOutput};
pub use stats::{print_statistics, summarize};
pub use traits::{ExplorationSummary, OutputError, OutputHandler, OutputResult};

use crate::config::OutputConfig;

/// Builds the handlers selected by an output configuration
///
/// # Arguments
///
/// * `config` - Output destinations; unset paths are skipped
///
/// # Returns
///
/// Handlers in a fixed order: graph JSON, markdown summary, SQLite export
pub fn handlers_for(config: &OutputConfig) -> Vec<Box<dyn OutputHandler>> {
    let mut handlers: Vec<Box<dyn OutputHandler>> = Vec::new();

    if let Some(path) = &config.graph_path {
        handlers.push(Box::new(GraphJsonOutput::new(path)));
    }
    if let Some(path) = &config.summary_path {
        handlers.push(Box::new(MarkdownOutput::new(path)));
    }
    if let Some(path) = &config.database_path {
        handlers.push(Box::new(SqliteOutput::new(path)));
    }

    handlers
}
