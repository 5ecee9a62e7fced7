//! Interrupting an exploration and resuming it from a serialized state

use crate::common::{config, html, links, url, Site, SitePage};
use discovery_engine::analysis::HtmlAnalyzer;
use discovery_engine::crawler::{explore, explore_from_state, TerminationReason};
use discovery_engine::output::write_state_file;
use discovery_engine::state::{
    deserialize_exploration_state, serialize_exploration_state, ExplorationState,
};
use discovery_engine::ExplorationResult;
use std::collections::HashSet;

fn site() -> Site {
    Site::new()
        .page("/", html("Home", &links(&["/a", "/b", "/c"])))
        .page("/a", html("A", &links(&["/"])))
        .page("/b", html("B", ""))
        .page("/c", html("C", &links(&["/a"])))
}

#[tokio::test(start_paused = true)]
async fn test_resumed_exploration_matches_uninterrupted_one() {
    let analyzer = HtmlAnalyzer::new();

    let full_site = site();
    let full = explore(&config("/"), &full_site, &SitePage::new(), &analyzer)
        .await
        .unwrap();

    let interrupted_site = site();
    let mut first = config("/");
    first.max_pages = 2;
    let mut state = ExplorationState::new(&first.start_url);
    let page = SitePage::new();
    let partial = explore_from_state(&first, &interrupted_site, &page, &analyzer, &mut state)
        .await
        .unwrap();
    assert_eq!(partial.termination, TerminationReason::MaxPages);
    assert_eq!(partial.graph.node_count(), 2);
    assert!(!state.graph.is_complete());

    let json = serialize_exploration_state(&state).unwrap();
    let mut restored = deserialize_exploration_state(&json).unwrap();
    assert_eq!(restored, state);

    let second = config("/");
    let page = SitePage::new();
    let resumed = explore_from_state(&second, &interrupted_site, &page, &analyzer, &mut restored)
        .await
        .unwrap();

    assert_eq!(resumed.termination, TerminationReason::QueueExhausted);
    let urls = |r: &ExplorationResult| -> Vec<String> {
        r.graph.nodes.iter().map(|n| n.url.clone()).collect()
    };
    assert_eq!(urls(&resumed), urls(&full));
    assert_eq!(resumed.graph.edge_count(), full.graph.edge_count());
    assert_eq!(resumed.unresolved_edges, 0);

    let ids: HashSet<_> = resumed.graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.len(), resumed.graph.node_count());
    assert!(resumed.graph.dangling_edges().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_resume_never_revisits_pages() {
    let site = site();
    let analyzer = HtmlAnalyzer::new();

    let mut first = config("/");
    first.max_pages = 2;
    let mut state = ExplorationState::new(&first.start_url);
    explore_from_state(&first, &site, &SitePage::new(), &analyzer, &mut state)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    write_state_file(&state, &path).unwrap();
    let json = std::fs::read_to_string(&path).unwrap();
    let mut restored = deserialize_exploration_state(&json).unwrap();

    explore_from_state(&config("/"), &site, &SitePage::new(), &analyzer, &mut restored)
        .await
        .unwrap();

    assert_eq!(
        site.navigations(),
        vec![url("/"), url("/a"), url("/b"), url("/c")]
    );
    assert!(restored.queue.is_empty());
    assert_eq!(restored.graph.node_count(), 4);
}
