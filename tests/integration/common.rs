//! Scripted site used as the browser collaborator in integration tests

use async_trait::async_trait;
use discovery_engine::analysis::parse_dom;
use discovery_engine::browser::{
    BrowserEngine, BrowserError, NavigationResponse, DOM_SIZE, LOCATION, OUTER_HTML, TITLE,
};
use discovery_engine::config::ExplorationConfig;
use discovery_engine::spa::SpaOptions;
use discovery_engine::url::normalize_url;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

pub const ORIGIN: &str = "https://app.test";

/// Absolute URL of a path on the scripted site
pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

/// A small HTML document
pub fn html(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>",
        title, title, body
    )
}

/// One anchor per path, wrapped in a nav list
pub fn links(paths: &[&str]) -> String {
    let items: String = paths
        .iter()
        .map(|p| format!("<li><a href=\"{}\">{}</a></li>", p, p))
        .collect();
    format!("<ul>{}</ul>", items)
}

/// Configuration with fast readiness settings for the scripted site
pub fn config(start_path: &str) -> ExplorationConfig {
    let mut config = ExplorationConfig::new(url(start_path));
    config.spa_options = Some(SpaOptions {
        stability_timeout_ms: 1_000,
        network_idle_timeout_ms: 20,
        poll_interval_ms: 10,
    });
    config
}

enum Route {
    Page { status: u16, body: String },
    Redirect(String),
    Dynamic(String),
    Fail,
}

/// What the scripted page currently shows
struct Loaded {
    url: String,
    html: String,
}

/// Page handle for `Site`
#[derive(Default)]
pub struct SitePage {
    current: Mutex<Option<Loaded>>,
}

impl SitePage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// In-memory web application keyed by normalized URL
pub struct Site {
    routes: HashMap<String, Route>,
    dynamic_visits: Mutex<HashMap<String, u32>>,
    navigations: Mutex<Vec<String>>,
}

impl Site {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            dynamic_visits: Mutex::new(HashMap::new()),
            navigations: Mutex::new(Vec::new()),
        }
    }

    fn route(mut self, path: &str, route: Route) -> Self {
        self.routes.insert(normalize_url(&url(path)), route);
        self
    }

    /// Serves `body` with status 200
    pub fn page(self, path: &str, body: String) -> Self {
        self.route(path, Route::Page { status: 200, body })
    }

    /// Serves `body` with the given status
    pub fn status(self, path: &str, status: u16, body: String) -> Self {
        self.route(path, Route::Page { status, body })
    }

    /// Lands on `to` when `from` is requested
    pub fn redirect(self, from: &str, to: &str) -> Self {
        self.route(from, Route::Redirect(to.to_string()))
    }

    /// Serves a page whose content changes on every visit
    pub fn dynamic(self, path: &str, title: &str) -> Self {
        self.route(path, Route::Dynamic(title.to_string()))
    }

    /// Fails every navigation to `path`
    pub fn failing(self, path: &str) -> Self {
        self.route(path, Route::Fail)
    }

    /// URLs passed to `navigate`, in call order
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    fn load(&self, requested: &str) -> Result<(u16, String, String), BrowserError> {
        let key = normalize_url(requested);

        match self.routes.get(&key) {
            Some(Route::Page { status, body }) => {
                Ok((*status, requested.to_string(), body.clone()))
            }
            Some(Route::Redirect(to)) => {
                let target = url(to);
                let (status, _, body) = self.load(&target)?;
                Ok((status, target, body))
            }
            Some(Route::Dynamic(title)) => {
                let mut visits = self.dynamic_visits.lock().unwrap();
                let n = visits.entry(key).or_default();
                *n += 1;
                Ok((200, requested.to_string(), html(title, &format!("<p>visit {}</p>", n))))
            }
            Some(Route::Fail) => Err(BrowserError::Navigation {
                url: requested.to_string(),
                message: "connection refused".to_string(),
            }),
            None => Ok((404, requested.to_string(), html("Not Found", ""))),
        }
    }
}

#[async_trait]
impl BrowserEngine for Site {
    type Page = SitePage;

    async fn navigate(
        &self,
        page: &SitePage,
        url: &str,
    ) -> Result<NavigationResponse, BrowserError> {
        self.navigations.lock().unwrap().push(url.to_string());

        let (status, final_url, body) = self.load(url)?;
        *page.current.lock().unwrap() = Some(Loaded {
            url: final_url,
            html: body,
        });

        Ok(NavigationResponse { status: Some(status) })
    }

    async fn current_url(&self, page: &SitePage) -> Result<String, BrowserError> {
        let current = page.current.lock().unwrap();
        current
            .as_ref()
            .map(|loaded| loaded.url.clone())
            .ok_or(BrowserError::NoPage)
    }

    async fn evaluate(&self, page: &SitePage, expression: &str) -> Result<Value, BrowserError> {
        let current = page.current.lock().unwrap();
        let loaded = current.as_ref().ok_or(BrowserError::NoPage)?;

        match expression {
            OUTER_HTML => Ok(json!(loaded.html)),
            DOM_SIZE => Ok(json!(loaded.html.len())),
            LOCATION => Ok(json!(loaded.url)),
            TITLE => Ok(json!(parse_dom(&loaded.html, &loaded.url).title)),
            other => Err(BrowserError::UnsupportedExpression(other.to_string())),
        }
    }
}
