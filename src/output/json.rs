//! JSON files: the graph document and the resumable state snapshot

use crate::crawler::ExplorationResult;
use crate::output::traits::{ExplorationSummary, OutputHandler, OutputResult};
use crate::state::{serialize_exploration_state, ExplorationState};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the completed graph as a JSON document
pub struct GraphJsonOutput {
    path: PathBuf,
}

impl GraphJsonOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for GraphJsonOutput {
    fn name(&self) -> &'static str {
        "graph JSON"
    }

    fn write(&self, result: &ExplorationResult, _summary: &ExplorationSummary) -> OutputResult<()> {
        fs::write(&self.path, result.graph.to_json()?)?;
        Ok(())
    }
}

/// Persists a state snapshot so the exploration can be resumed later
///
/// The document is written next to `path` first and then renamed over it,
/// so an interrupted write never leaves a truncated snapshot behind.
pub fn write_state_file(state: &ExplorationState, path: &Path) -> OutputResult<()> {
    let json = serialize_exploration_state(state)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    Ok(())
}
