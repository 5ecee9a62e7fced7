//! End-to-end exploration behaviour against the scripted site

use crate::common::{config, html, links, url, Site, SitePage};
use discovery_engine::analysis::HtmlAnalyzer;
use discovery_engine::crawler::{
    explore, ExplorationStrategy, Orchestrator, OrchestratorStatus, ProgressInfo, TerminationReason,
};
use discovery_engine::cycle::CycleReason;
use discovery_engine::state::ExplorationState;
use discovery_engine::{ActionType, DiscoveryError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

fn node_urls(result: &discovery_engine::ExplorationResult) -> Vec<String> {
    result.graph.nodes.iter().map(|n| n.url.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_single_page_with_page_budget_of_one() {
    let site = Site::new().page("/", html("Home", "<p>Nothing to see</p>"));
    let mut config = config("/");
    config.max_pages = 1;

    let result = explore(&config, &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.node_count(), 1);
    assert_eq!(result.graph.edge_count(), 0);
    assert_eq!(result.coverage.page_coverage.percentage, 100.0);
    assert_eq!(result.termination, TerminationReason::MaxPages);
    assert!(result.graph.is_complete());
    assert_eq!(result.graph.nodes[0].id, "node-1");
    assert_eq!(result.graph.nodes[0].title, "Home");
}

#[tokio::test(start_paused = true)]
async fn test_external_links_are_not_followed() {
    let site = Site::new().page("/", html("Home", &links(&["https://other.test/pricing"])));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.node_count(), 1);
    assert_eq!(result.graph.edge_count(), 0);
    assert_eq!(result.unresolved_edges, 0);
    assert_eq!(result.termination, TerminationReason::QueueExhausted);
    assert_eq!(site.navigations(), vec![url("/")]);
}

#[tokio::test(start_paused = true)]
async fn test_equivalent_urls_are_suppressed_as_cycles() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/about", "/about/#team"])))
        .page("/about", html("About", "<p>Team</p>"));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.node_count(), 2);
    // Both links resolve to the single About node.
    assert_eq!(result.graph.edge_count(), 2);
    assert!(result.graph.edges.iter().all(|e| e.target_id == "node-2"));
    assert!(result.graph.dangling_edges().is_empty());

    assert_eq!(result.cycle_report.total_cycles_detected, 1);
    assert_eq!(result.cycle_report.entries[0].reason, CycleReason::DuplicateState);
    assert_eq!(result.cycle_report.entries[0].url, url("/about/#team"));
    assert_eq!(result.skipped_urls, 0);
}

#[tokio::test(start_paused = true)]
async fn test_breadth_first_order() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a", "/b"])))
        .page("/a", html("A", &links(&["/a1"])))
        .page("/b", html("B", ""))
        .page("/a1", html("A1", ""));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(
        node_urls(&result),
        vec![url("/"), url("/a"), url("/b"), url("/a1")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_depth_first_order() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a", "/b"])))
        .page("/a", html("A", &links(&["/a1"])))
        .page("/b", html("B", ""))
        .page("/a1", html("A1", ""));
    let mut config = config("/");
    config.strategy = ExplorationStrategy::DepthFirst;

    let result = explore(&config, &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(
        node_urls(&result),
        vec![url("/"), url("/b"), url("/a"), url("/a1")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_max_depth_limits_links() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a"])))
        .page("/a", html("A", &links(&["/b"])))
        .page("/b", html("B", ""));
    let mut config = config("/");
    config.max_depth = Some(1);

    let result = explore(&config, &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(node_urls(&result), vec![url("/"), url("/a")]);
    assert_eq!(result.graph.edge_count(), 1);
    assert_eq!(result.unresolved_edges, 0);
    assert!(!site.navigations().contains(&url("/b")));
}

#[tokio::test(start_paused = true)]
async fn test_failed_pages_are_skipped() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/missing", "/down", "/ok"])))
        .failing("/down")
        .page("/ok", html("Ok", ""));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(node_urls(&result), vec![url("/"), url("/ok")]);
    assert_eq!(result.graph.edge_count(), 1);
    assert_eq!(result.skipped_urls, 2);
    assert_eq!(result.skip_reasons.get("error-status"), Some(&1));
    assert_eq!(result.skip_reasons.get("navigation-failed"), Some(&1));
    // Edges towards the failed pages never get a target.
    assert_eq!(result.unresolved_edges, 2);
    assert_eq!(result.coverage.path_coverage.covered, 1);
    assert_eq!(result.coverage.path_coverage.total, 3);
}

#[tokio::test(start_paused = true)]
async fn test_redirect_resolves_edges_for_both_urls() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/old", "/new"])))
        .redirect("/old", "/new")
        .page("/new", html("New", ""));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(node_urls(&result), vec![url("/"), url("/new")]);
    assert_eq!(result.graph.edge_count(), 2);
    assert!(result.graph.edges.iter().all(|e| e.target_id == "node-2"));
    assert!(result.graph.edges.iter().all(|e| e.http_status == Some(200)));
    assert_eq!(result.unresolved_edges, 0);
    assert_eq!(result.cycle_report.duplicate_states, 1);
}

#[tokio::test(start_paused = true)]
async fn test_parameterized_url_limit() {
    let site = Site::new()
        .page(
            "/",
            html(
                "Home",
                &links(&[
                    "/news?utm_source=1",
                    "/news?utm_source=2",
                    "/news?utm_source=3",
                    "/news?utm_source=4",
                ]),
            ),
        )
        .dynamic("/news", "News");
    let mut config = config("/");
    config.cycle_config.parameterized_url_limit = 2;

    let result = explore(&config, &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.node_count(), 3);
    assert_eq!(result.cycle_report.parameterized_url_limits, 2);
    assert_eq!(result.cycle_report.duplicate_states, 0);

    let counts: Vec<u32> = result.cycle_report.entries.iter().map(|e| e.count).collect();
    assert_eq!(counts, vec![1, 2]);

    // Every link reached the first News node.
    assert_eq!(result.graph.edge_count(), 4);
    assert!(result.graph.edges.iter().all(|e| e.target_id == "node-2"));
}

#[tokio::test(start_paused = true)]
async fn test_infinite_scroll_guard() {
    let mut site = Site::new();
    for n in 1..=6 {
        site = site.page(
            &format!("/feed?page={}", n),
            html(&format!("Feed {}", n), &links(&[&format!("/feed?page={}", n + 1)])),
        );
    }
    let mut config = config("/feed?page=1");
    config.cycle_config.infinite_scroll_threshold = 3;

    let result = explore(&config, &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.node_count(), 3);
    assert_eq!(result.cycle_report.infinite_scrolls, 1);
    assert_eq!(result.cycle_report.entries[0].url, url("/feed?page=4"));
    assert_eq!(result.unresolved_edges, 1);
    assert!(!site.navigations().contains(&url("/feed?page=5")));
}

#[tokio::test(start_paused = true)]
async fn test_coverage_thresholds_stop_early() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a", "/b", "/c", "/d"])))
        .page("/a", html("A", ""))
        .page("/b", html("B", ""))
        .page("/c", html("C", ""))
        .page("/d", html("D", ""));
    let mut config = config("/");
    config.coverage_thresholds = Some(discovery_engine::coverage::CoverageThresholds {
        page: Some(50.0),
        element: None,
        path: None,
    });

    let result = explore(&config, &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.termination, TerminationReason::CoverageMet);
    assert_eq!(result.graph.node_count(), 3);
    assert!(result.coverage.page_coverage.percentage >= 50.0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_terminates() {
    let mut site = Site::new();
    for n in 0..10 {
        let path = if n == 0 { "/".to_string() } else { format!("/p{}", n) };
        site = site.page(&path, html(&format!("Page {}", n), &links(&[&format!("/p{}", n + 1)])));
    }
    let mut config = config("/");
    config.timeout_ms = 50;

    let result = explore(&config, &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.termination, TerminationReason::Timeout);
    assert!(result.graph.node_count() >= 1);
    assert!(result.graph.node_count() < 10);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_from_progress_callback() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a", "/b", "/c"])))
        .page("/a", html("A", ""))
        .page("/b", html("B", ""))
        .page("/c", html("C", ""));
    let config = config("/");
    let page = SitePage::new();
    let analyzer = HtmlAnalyzer::new();

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);

    let mut orchestrator = Orchestrator::new(&config, &site, &page, &analyzer)
        .unwrap()
        .with_cancellation(cancel)
        .with_progress(move |progress| {
            if progress.pages_visited >= 2 {
                flag.store(true, Ordering::Relaxed);
            }
        });

    assert_eq!(orchestrator.status(), OrchestratorStatus::Idle);
    let mut state = ExplorationState::new(&config.start_url);
    let result = orchestrator.run(&mut state).await;

    assert_eq!(orchestrator.status(), OrchestratorStatus::Completed);
    assert_eq!(result.termination, TerminationReason::Cancelled);
    assert_eq!(result.graph.node_count(), 2);
    assert_eq!(state.pages_remaining(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_progress_reports_every_dequeued_url() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a", "/a", "/missing"])))
        .page("/a", html("A", ""));
    let config = config("/");
    let page = SitePage::new();
    let analyzer = HtmlAnalyzer::new();

    let reports: Arc<Mutex<Vec<ProgressInfo>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);

    let mut orchestrator = Orchestrator::new(&config, &site, &page, &analyzer)
        .unwrap()
        .with_progress(move |progress| sink.lock().unwrap().push(*progress));
    orchestrator.run(&mut ExplorationState::new(&config.start_url)).await;

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].pages_visited, 1);
    assert_eq!(reports[0].pages_remaining, 2);

    let last = reports[2];
    assert_eq!(last.pages_discovered, 3);
    assert_eq!(last.pages_visited, 2);
    assert_eq!(last.pages_remaining, 0);
    assert_eq!(last.elements_activated, 3);
}

#[tokio::test(start_paused = true)]
async fn test_scope_applies_to_start_url_and_links() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/admin/users", "/docs"])))
        .page("/docs", html("Docs", ""));
    let mut config = config("/");
    config.scope.deny_patterns = vec!["/admin".to_string()];

    let result = explore(&config, &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();
    assert_eq!(node_urls(&result), vec![url("/"), url("/docs")]);
    assert!(!site.navigations().contains(&url("/admin/users")));

    let denied = Site::new().page("/admin", html("Admin", ""));
    let mut config = self::config("/admin");
    config.scope.deny_patterns = vec!["/admin".to_string()];

    let result = explore(&config, &denied, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();
    assert_eq!(result.graph.node_count(), 0);
    assert_eq!(result.skip_reasons.get("out-of-scope"), Some(&1));
    assert!(denied.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_buttons_are_counted_but_not_followed() {
    let body = format!(
        "{}<button id=\"buy\">Buy</button><a href=\"javascript:void(0)\">Menu</a>",
        links(&["/a"])
    );
    let site = Site::new()
        .page("/", html("Home", &body))
        .page("/a", html("A", ""));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.node_count(), 2);
    assert_eq!(result.graph.edges[0].action_type, ActionType::Navigation);
    assert_eq!(result.coverage.element_coverage.covered, 1);
    assert_eq!(result.coverage.element_coverage.total, 3);
}

#[tokio::test]
async fn test_invalid_scope_is_rejected() {
    let site = Site::new();
    let mut config = config("/");
    config.scope.allow_patterns = vec!["(unclosed".to_string()];

    match explore(&config, &site, &SitePage::new(), &HtmlAnalyzer::new()).await {
        Err(DiscoveryError::InvalidScope(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("(unclosed"));
        }
        other => panic!("expected invalid scope, got {:?}", other.map(|r| r.termination)),
    }
    assert!(site.navigations().is_empty());
}
