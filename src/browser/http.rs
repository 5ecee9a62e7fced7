//! Static HTTP browser
//!
//! Loads pages with plain GET requests and answers the handful of
//! expressions the engine issues from the downloaded document. No scripts
//! run, so client-side navigation is invisible to it; the DOM is whatever the
//! server sent.

use super::{BrowserEngine, BrowserError, NavigationResponse, DOM_SIZE, LOCATION, OUTER_HTML, TITLE};
use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::{Html, Selector};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Maximum redirect hops followed for one navigation
const MAX_REDIRECTS: usize = 10;

/// The document most recently loaded into a page
#[derive(Debug, Clone)]
struct Snapshot {
    url: String,
    status: u16,
    body: String,
}

/// Page handle for `HttpBrowser`
#[derive(Debug, Default)]
pub struct HttpPage {
    snapshot: RwLock<Option<Snapshot>>,
}

impl HttpPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of the last navigation, if any
    pub async fn status(&self) -> Option<u16> {
        self.snapshot.read().await.as_ref().map(|s| s.status)
    }
}

/// `BrowserEngine` backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    /// Builds the browser and its HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - User agent and request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(HttpBrowser)` - Client built
    /// * `Err(BrowserError::Client)` - TLS backend or builder failure
    pub fn new(config: &HttpConfig) -> Result<Self, BrowserError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    async fn with_snapshot<T>(
        &self,
        page: &HttpPage,
        f: impl FnOnce(&Snapshot) -> T,
    ) -> Result<T, BrowserError> {
        let guard = page.snapshot.read().await;
        guard.as_ref().map(f).ok_or(BrowserError::NoPage)
    }
}

#[async_trait]
impl BrowserEngine for HttpBrowser {
    type Page = HttpPage;

    async fn navigate(
        &self,
        page: &HttpPage,
        url: &str,
    ) -> Result<NavigationResponse, BrowserError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                BrowserError::Timeout { url: url.to_string() }
            } else if e.is_connect() {
                BrowserError::Navigation {
                    url: url.to_string(),
                    message: "Connection refused".to_string(),
                }
            } else {
                BrowserError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Servers that omit the header are given the benefit of the doubt.
        if !content_type.is_empty() && !content_type.contains("text/html") {
            return Err(BrowserError::ContentMismatch {
                url: final_url,
                content_type,
            });
        }

        let body = response.text().await.map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!("Loaded {} ({}, {} bytes)", final_url, status, body.len());

        *page.snapshot.write().await = Some(Snapshot {
            url: final_url,
            status,
            body,
        });

        Ok(NavigationResponse { status: Some(status) })
    }

    async fn current_url(&self, page: &HttpPage) -> Result<String, BrowserError> {
        self.with_snapshot(page, |s| s.url.clone()).await
    }

    async fn evaluate(&self, page: &HttpPage, expression: &str) -> Result<Value, BrowserError> {
        match expression.trim() {
            OUTER_HTML => self.with_snapshot(page, |s| Value::from(s.body.clone())).await,
            DOM_SIZE => {
                self.with_snapshot(page, |s| Value::from(s.body.encode_utf16().count()))
                    .await
            }
            TITLE => {
                self.with_snapshot(page, |s| Value::from(document_title(&s.body)))
                    .await
            }
            LOCATION => self.with_snapshot(page, |s| Value::from(s.url.clone())).await,
            other => Err(BrowserError::UnsupportedExpression(other.to_string())),
        }
    }
}

/// Text of the first `<title>`, trimmed; empty when absent
fn document_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
