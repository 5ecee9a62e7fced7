//! SQLite export of a finished exploration
//!
//! Every export appends one row to `runs` and the graph, journeys and cycle
//! entries of that run, so several explorations can share a database file.

use crate::crawler::ExplorationResult;
use crate::output::traits::{ExplorationSummary, OutputHandler, OutputResult};
use rusqlite::{params, Connection};
use std::path::PathBuf;

/// SQL schema for the export database
pub const SCHEMA_SQL: &str = r#"
-- One row per exported exploration
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_url TEXT NOT NULL,
    strategy TEXT NOT NULL,
    started_at TEXT NOT NULL,
    completed_at TEXT,
    termination TEXT NOT NULL,
    config_hash TEXT,
    page_coverage REAL NOT NULL,
    element_coverage REAL NOT NULL,
    path_coverage REAL NOT NULL,
    skipped_urls INTEGER NOT NULL,
    unresolved_edges INTEGER NOT NULL
);

-- Page states
CREATE TABLE IF NOT EXISTS nodes (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    id TEXT NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    element_count INTEGER NOT NULL,
    dom_hash TEXT NOT NULL,
    discovered_at TEXT NOT NULL,
    screenshot_path TEXT,
    PRIMARY KEY (run_id, id)
);

CREATE INDEX IF NOT EXISTS idx_nodes_url ON nodes(url);

-- Transitions between page states
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    source_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    action_type TEXT NOT NULL,
    selector TEXT NOT NULL,
    http_status INTEGER
);

CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(run_id, source_id);
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(run_id, target_id);

-- Identified user journeys
CREATE TABLE IF NOT EXISTS journeys (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    journey_type TEXT NOT NULL,
    entry_node_id TEXT NOT NULL,
    exit_node_id TEXT NOT NULL,
    PRIMARY KEY (run_id, id)
);

CREATE TABLE IF NOT EXISTS journey_steps (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    journey_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    source_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    action_type TEXT NOT NULL,
    PRIMARY KEY (run_id, journey_id, position)
);

-- Suppressed revisits
CREATE TABLE IF NOT EXISTS cycles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    normalized_url TEXT NOT NULL,
    dom_hash TEXT NOT NULL,
    reason TEXT NOT NULL,
    occurrence INTEGER NOT NULL,
    detected_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema is in place
/// * `Err(rusqlite::Error)` - Failed to create the schema
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Gets the current schema version
pub fn get_schema_version() -> u32 {
    1
}

/// Exports explorations to a SQLite database file
pub struct SqliteOutput {
    path: PathBuf,
}

impl SqliteOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for SqliteOutput {
    fn name(&self) -> &'static str {
        "SQLite export"
    }

    fn write(&self, result: &ExplorationResult, summary: &ExplorationSummary) -> OutputResult<()> {
        let mut conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        initialize_schema(&conn)?;

        export_exploration(&mut conn, result, summary)?;
        Ok(())
    }
}

/// Writes one exploration into an initialized database
///
/// # Returns
///
/// * `Ok(run_id)` - Id of the inserted `runs` row
/// * `Err(OutputError)` - The transaction was rolled back
pub fn export_exploration(
    conn: &mut Connection,
    result: &ExplorationResult,
    summary: &ExplorationSummary,
) -> OutputResult<i64> {
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO runs (start_url, strategy, started_at, completed_at, termination,
                           config_hash, page_coverage, element_coverage, path_coverage,
                           skipped_urls, unresolved_edges)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            summary.start_url,
            summary.strategy,
            summary.started_at,
            summary.completed_at,
            summary.termination,
            summary.config_hash,
            result.coverage.page_coverage.percentage,
            result.coverage.element_coverage.percentage,
            result.coverage.path_coverage.percentage,
            result.skipped_urls as i64,
            result.unresolved_edges as i64,
        ],
    )?;
    let run_id = tx.last_insert_rowid();

    {
        let mut insert_node = tx.prepare(
            "INSERT INTO nodes (run_id, id, url, title, element_count, dom_hash,
                                discovered_at, screenshot_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for node in &result.graph.nodes {
            insert_node.execute(params![
                run_id,
                node.id,
                node.url,
                node.title,
                node.element_count as i64,
                node.dom_hash,
                node.discovery_timestamp.to_rfc3339(),
                node.screenshot_path,
            ])?;
        }

        let mut insert_edge = tx.prepare(
            "INSERT INTO edges (run_id, source_id, target_id, action_type, selector, http_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for edge in &result.graph.edges {
            insert_edge.execute(params![
                run_id,
                edge.source_id,
                edge.target_id,
                edge.action_type.as_str(),
                edge.selector,
                edge.http_status,
            ])?;
        }

        let mut insert_journey = tx.prepare(
            "INSERT INTO journeys (run_id, id, name, journey_type, entry_node_id, exit_node_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        let mut insert_step = tx.prepare(
            "INSERT INTO journey_steps (run_id, journey_id, position, source_id, target_id,
                                        action_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for journey in &result.journeys {
            insert_journey.execute(params![
                run_id,
                journey.id,
                journey.name,
                journey.journey_type.as_str(),
                journey.entry_node_id,
                journey.exit_node_id,
            ])?;
            for (position, step) in journey.steps.iter().enumerate() {
                insert_step.execute(params![
                    run_id,
                    journey.id,
                    position as i64,
                    step.source_id,
                    step.target_id,
                    step.action_type.as_str(),
                ])?;
            }
        }

        let mut insert_cycle = tx.prepare(
            "INSERT INTO cycles (run_id, url, normalized_url, dom_hash, reason, occurrence,
                                 detected_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for entry in &result.cycle_report.entries {
            insert_cycle.execute(params![
                run_id,
                entry.url,
                entry.fingerprint.normalized_url,
                entry.fingerprint.dom_hash,
                entry.reason.as_str(),
                entry.count,
                entry.detected_at.to_rfc3339(),
            ])?;
        }
    }

    tx.commit()?;
    Ok(run_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ExplorationStrategy;
    use crate::output::fixtures::sample_result;
    use crate::output::stats::summarize;

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
        assert_eq!(get_schema_version(), 1);
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["runs", "nodes", "edges", "journeys", "journey_steps", "cycles"] {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    params![table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "missing table {}", table);
        }
    }

    #[test]
    fn test_export_exploration() {
        let mut conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        let result = sample_result();
        let summary = summarize(&result, ExplorationStrategy::BreadthFirst, Some("abc123"));

        let run_id = export_exploration(&mut conn, &result, &summary).unwrap();

        assert_eq!(count(&conn, "runs"), 1);
        assert_eq!(count(&conn, "nodes"), 3);
        assert_eq!(count(&conn, "edges"), 3);
        assert_eq!(count(&conn, "journeys"), 1);
        assert_eq!(count(&conn, "journey_steps"), 1);
        assert_eq!(count(&conn, "cycles"), 1);

        let (termination, hash): (String, Option<String>) = conn
            .query_row(
                "SELECT termination, config_hash FROM runs WHERE id = ?1",
                params![run_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(termination, "queue-exhausted");
        assert_eq!(hash.as_deref(), Some("abc123"));

        let form_edges: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM edges WHERE action_type = 'form-submit'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(form_edges, 1);
    }

    #[test]
    fn test_sqlite_output_appends_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explore.db");
        let result = sample_result();
        let summary = summarize(&result, ExplorationStrategy::BreadthFirst, None);

        let output = SqliteOutput::new(&path);
        output.write(&result, &summary).unwrap();
        output.write(&result, &summary).unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "runs"), 2);
        assert_eq!(count(&conn, "nodes"), 6);
    }
}
