//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of an
//! exploration: run information, coverage, suppressed cycles, skipped URLs
//! and the identified user journeys.

use crate::crawler::ExplorationResult;
use crate::output::traits::{ExplorationSummary, OutputHandler, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Maximum number of cycle entries listed individually
const MAX_LISTED_CYCLES: usize = 20;

/// Writes the markdown summary to a file
pub struct MarkdownOutput {
    path: PathBuf,
}

impl MarkdownOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for MarkdownOutput {
    fn name(&self) -> &'static str {
        "markdown summary"
    }

    fn write(&self, result: &ExplorationResult, summary: &ExplorationSummary) -> OutputResult<()> {
        generate_markdown_summary(result, summary, &self.path)
    }
}

/// Generates a markdown summary file
///
/// # Arguments
///
/// * `result` - The finished exploration
/// * `summary` - Statistics derived from `result`
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    result: &ExplorationResult,
    summary: &ExplorationSummary,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(result, summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an exploration as markdown
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(result: &ExplorationResult, summary: &ExplorationSummary) -> String {
    let mut md = String::new();

    md.push_str("# Discovery Engine Exploration Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", summary.start_url));
    md.push_str(&format!("- **Strategy**: {}\n", summary.strategy));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(completed) = &summary.completed_at {
        md.push_str(&format!("- **Completed**: {}\n", completed));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Stopped Because**: {}\n", summary.termination));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Page States**: {}\n", summary.total_nodes));
    md.push_str(&format!("- **Transitions**: {}\n", summary.total_edges));
    md.push_str(&format!("- **User Journeys**: {}\n", summary.total_journeys));
    md.push_str(&format!("- **Cycles Suppressed**: {}\n", summary.total_cycles));
    md.push_str(&format!("- **Skipped URLs**: {}\n", summary.skipped_urls));
    md.push_str(&format!("- **Unresolved Edges**: {}\n", summary.unresolved_edges));
    md.push_str(&format!("- **Yield**: {:.2}%\n\n", summary.yield_rate()));

    // Coverage
    md.push_str("## Coverage\n\n");
    md.push_str("| Dimension | Covered | Total | Percentage |\n");
    md.push_str("|-----------|---------|-------|------------|\n");
    for (label, ratio) in [
        ("Pages", &summary.coverage.page_coverage),
        ("Elements", &summary.coverage.element_coverage),
        ("Paths", &summary.coverage.path_coverage),
    ] {
        md.push_str(&format!(
            "| {} | {} | {} | {:.1}% |\n",
            label, ratio.covered, ratio.total, ratio.percentage
        ));
    }
    md.push('\n');

    if !summary.edges_by_action.is_empty() {
        md.push_str("## Transitions by Action\n\n");
        md.push_str("| Action | Count |\n");
        md.push_str("|--------|-------|\n");
        for (action, count) in &summary.edges_by_action {
            md.push_str(&format!("| {} | {} |\n", action, count));
        }
        md.push('\n');
    }

    // Cycle report
    if !result.cycle_report.entries.is_empty() {
        md.push_str("## Cycle Report\n\n");
        md.push_str("| Reason | Count |\n");
        md.push_str("|--------|-------|\n");
        for (reason, count) in &summary.cycles_by_reason {
            md.push_str(&format!("| {} | {} |\n", reason, count));
        }
        md.push('\n');

        md.push_str("| URL | Reason | Occurrence |\n");
        md.push_str("|-----|--------|------------|\n");
        for entry in result.cycle_report.entries.iter().take(MAX_LISTED_CYCLES) {
            md.push_str(&format!("| {} | {} | {} |\n", entry.url, entry.reason, entry.count));
        }
        if result.cycle_report.entries.len() > MAX_LISTED_CYCLES {
            md.push_str(&format!(
                "\n... and {} more\n",
                result.cycle_report.entries.len() - MAX_LISTED_CYCLES
            ));
        }
        md.push('\n');
    }

    if !summary.skip_reasons.is_empty() {
        md.push_str("## Skipped URLs\n\n");
        md.push_str("| Reason | Count |\n");
        md.push_str("|--------|-------|\n");
        for (reason, count) in &summary.skip_reasons {
            md.push_str(&format!("| {} | {} |\n", reason, count));
        }
        md.push('\n');
    }

    // Journeys
    if !result.journeys.is_empty() {
        md.push_str("## User Journeys\n\n");
        md.push_str("| Id | Name | Type | Steps |\n");
        md.push_str("|----|------|------|-------|\n");
        for journey in &result.journeys {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                journey.id,
                journey.name,
                journey.journey_type,
                journey.steps.len()
            ));
        }
        md.push('\n');
    }

    md
}
