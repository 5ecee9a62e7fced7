//! Browser collaborator
//!
//! The orchestrator never talks to a browser directly. It drives a
//! `BrowserEngine`, which owns how pages are loaded and how expressions are
//! evaluated against them. The engine is handed a page handle it does not
//! own; the caller creates and disposes of pages.
//!
//! `HttpBrowser` is a static implementation backed by `reqwest`, suitable for
//! server-rendered sites.

mod http;

pub use http::{HttpBrowser, HttpPage};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Expression returning the serialized document
pub const OUTER_HTML: &str = "document.documentElement.outerHTML";

/// Expression returning the serialized document length, used as a DOM-size proxy
pub const DOM_SIZE: &str = "document.documentElement.outerHTML.length";

/// Expression returning the document title
pub const TITLE: &str = "document.title";

/// Expression returning the current location
pub const LOCATION: &str = "location.href";

/// Errors raised by a browser engine
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out")]
    Timeout { url: String },

    #[error("Unexpected content type '{content_type}' at {url}")]
    ContentMismatch { url: String, content_type: String },

    #[error("No page loaded")]
    NoPage,

    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// What a navigation reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationResponse {
    /// HTTP status of the main document, when the engine knows it
    pub status: Option<u16>,
}

impl NavigationResponse {
    /// True when the status is known and is a 4xx or 5xx
    pub fn is_error_status(&self) -> bool {
        matches!(self.status, Some(status) if status >= 400)
    }
}

/// Page automation primitives used by the orchestrator
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Page handle type; owned by the caller
    type Page: Send + Sync;

    /// Loads `url` into `page`
    async fn navigate(
        &self,
        page: &Self::Page,
        url: &str,
    ) -> Result<NavigationResponse, BrowserError>;

    /// URL currently shown by `page`
    async fn current_url(&self, page: &Self::Page) -> Result<String, BrowserError>;

    /// Evaluates a script expression in `page` and returns its JSON value
    async fn evaluate(
        &self,
        page: &Self::Page,
        expression: &str,
    ) -> Result<serde_json::Value, BrowserError>;

    /// Captures a screenshot for a newly recorded node, returning its path
    ///
    /// Engines without screenshot support keep the default, which captures nothing.
    async fn screenshot(
        &self,
        _page: &Self::Page,
        _node_id: &str,
    ) -> Result<Option<String>, BrowserError> {
        Ok(None)
    }
}

/// Evaluates `expression` and deserializes the result
pub async fn evaluate_as<E, T>(
    engine: &E,
    page: &E::Page,
    expression: &str,
) -> Result<T, BrowserError>
where
    E: BrowserEngine + ?Sized,
    T: DeserializeOwned,
{
    let value = engine.evaluate(page, expression).await?;
    serde_json::from_value(value)
        .map_err(|e| BrowserError::Evaluation(format!("{}: {}", expression, e)))
}
