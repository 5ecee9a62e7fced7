//! Journeys identified from explored graphs

use crate::common::{config, html, links, Site, SitePage};
use discovery_engine::analysis::HtmlAnalyzer;
use discovery_engine::crawler::explore;
use discovery_engine::journey::JourneyType;
use discovery_engine::ActionType;

const LOGIN_FORM: &str = r#"
    <form action="/dashboard" method="post">
        <input type="email" name="email" required>
        <input type="password" name="password" required>
        <button type="submit">Sign in</button>
    </form>"#;

#[tokio::test(start_paused = true)]
async fn test_login_form_becomes_authentication_journey() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/login"])))
        .page("/login", html("Sign in", LOGIN_FORM))
        .page("/dashboard", html("Dashboard", "<p>Welcome back</p>"));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.node_count(), 3);
    let submit = result
        .graph
        .edges
        .iter()
        .find(|e| e.action_type == ActionType::FormSubmit)
        .expect("form edge");
    assert_eq!((submit.source_id.as_str(), submit.target_id.as_str()), ("node-2", "node-3"));

    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.id, "journey-1");
    assert_eq!(journey.journey_type, JourneyType::Authentication);
    assert_eq!(journey.entry_node_id, "node-2");
    assert_eq!(journey.exit_node_id, "node-3");
    assert_eq!(journey.name, "Authentication: Sign in → Dashboard");
}

#[tokio::test(start_paused = true)]
async fn test_search_form_becomes_form_submission_journey() {
    let form = r#"<form action="/results"><input type="search" name="q"></form>"#;
    let site = Site::new()
        .page("/", html("Home", &links(&["/search"])))
        .page("/search", html("Search", form))
        .page("/results", html("Results", "<p>No matches</p>"));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.journeys.len(), 1);
    assert_eq!(result.journeys[0].journey_type, JourneyType::FormSubmission);
    assert_eq!(result.journeys[0].name, "Form Submission: Search → Results");
}

#[tokio::test(start_paused = true)]
async fn test_link_chain_becomes_content_navigation_journey() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a"])))
        .page("/a", html("A", &links(&["/b"])))
        .page("/b", html("B", ""));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.journey_type, JourneyType::ContentNavigation);
    assert_eq!(journey.steps.len(), 2);
    assert_eq!(journey.entry_node_id, "node-1");
    assert_eq!(journey.exit_node_id, "node-3");
}

#[tokio::test(start_paused = true)]
async fn test_single_hops_form_no_journeys() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a", "/b"])))
        .page("/a", html("A", ""))
        .page("/b", html("B", ""));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.edge_count(), 2);
    assert!(result.journeys.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_branching_page_does_not_start_a_chain() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a", "/x"])))
        .page("/a", html("A", &links(&["/b"])))
        .page("/x", html("X", ""))
        .page("/b", html("B", ""));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.edge_count(), 3);
    assert!(result.journeys.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_closed_loop_becomes_content_navigation_journey() {
    let site = Site::new()
        .page("/", html("Home", &links(&["/a"])))
        .page("/a", html("A", &links(&["/b"])))
        .page("/b", html("B", &links(&["/"])));

    let result = explore(&config("/"), &site, &SitePage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.edge_count(), 3);
    assert_eq!(result.journeys.len(), 1);
    let journey = &result.journeys[0];
    assert_eq!(journey.journey_type, JourneyType::ContentNavigation);
    assert_eq!(journey.steps.len(), 2);
    assert_eq!(journey.entry_node_id, "node-1");
    assert_eq!(journey.exit_node_id, "node-3");
    assert_eq!(journey.name, "Content Navigation: Home → B");
}
