//! Explorations over real HTTP using the built-in collaborators
//!
//! These tests use wiremock to serve a small site and run the full loop
//! with `HttpBrowser` and `HtmlAnalyzer`.

use discovery_engine::analysis::HtmlAnalyzer;
use discovery_engine::browser::{HttpBrowser, HttpPage};
use discovery_engine::config::ExplorationConfig;
use discovery_engine::crawler::{explore, TerminationReason};
use discovery_engine::output::{format_markdown_summary, summarize};
use discovery_engine::spa::SpaOptions;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

fn test_config(server: &MockServer) -> ExplorationConfig {
    let mut config = ExplorationConfig::new(format!("{}/", server.uri()));
    config.spa_options = Some(SpaOptions {
        stability_timeout_ms: 500,
        network_idle_timeout_ms: 20,
        poll_interval_ms: 10,
    });
    config
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_exploration_over_http() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html_response(
            r#"<html><head><title>Home</title></head><body>
                <a href="/about">About</a>
                <a href="/missing">Broken</a>
                <a href="https://elsewhere.test/">Partner</a>
            </body></html>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/about",
        html_response(
            r#"<html><head><title>About</title></head><body><a href="/">Home</a></body></html>"#,
        ),
    )
    .await;
    mount(&server, "/missing", ResponseTemplate::new(404)).await;

    let config = test_config(&server);
    let browser = HttpBrowser::new(&config.http).unwrap();

    let result = explore(&config, &browser, &HttpPage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.termination, TerminationReason::QueueExhausted);
    let titles: Vec<_> = result.graph.nodes.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "About"]);

    // Home → About, and About → Home created directly since Home is known.
    assert_eq!(result.graph.edge_count(), 2);
    assert!(result.graph.edges.iter().all(|e| e.http_status == Some(200)));
    assert_eq!(result.unresolved_edges, 1);
    assert_eq!(result.skip_reasons.get("error-status"), Some(&1));

    let summary = summarize(&result, config.strategy, None);
    let markdown = format_markdown_summary(&result, &summary);
    assert!(markdown.contains("| error-status | 1 |"));
}

#[tokio::test]
async fn test_non_html_documents_are_skipped() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html_response(
            r#"<html><head><title>Reports</title></head>
            <body><a href="/report.pdf">Q3</a></body></html>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/report.pdf",
        ResponseTemplate::new(200).set_body_raw(vec![0x25u8, 0x50, 0x44, 0x46], "application/pdf"),
    )
    .await;

    let config = test_config(&server);
    let browser = HttpBrowser::new(&config.http).unwrap();

    let result = explore(&config, &browser, &HttpPage::new(), &HtmlAnalyzer::new())
        .await
        .unwrap();

    assert_eq!(result.graph.node_count(), 1);
    assert_eq!(result.skip_reasons.get("navigation-failed"), Some(&1));
    assert_eq!(result.skipped_urls, 1);
}
