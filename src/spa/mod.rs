//! Page readiness for client-rendered applications
//!
//! A page is considered ready once its DOM stops changing. The DOM size
//! (`outerHTML.length`) is sampled every `poll-interval-ms`; when the value
//! has not changed for a continuous `network-idle-timeout-ms` the page is
//! ready. `stability-timeout-ms` caps the whole wait, so a page that never
//! settles (tickers, animations, infinite feeds) still returns.

use crate::browser::{evaluate_as, BrowserEngine, BrowserError, DOM_SIZE};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// Readiness polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaOptions {
    /// Hard ceiling for one readiness wait
    #[serde(rename = "stability-timeout-ms", default = "default_stability_timeout_ms")]
    pub stability_timeout_ms: u64,

    /// How long the DOM size must stay unchanged
    #[serde(rename = "network-idle-timeout-ms", default = "default_network_idle_timeout_ms")]
    pub network_idle_timeout_ms: u64,

    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for SpaOptions {
    fn default() -> Self {
        Self {
            stability_timeout_ms: default_stability_timeout_ms(),
            network_idle_timeout_ms: default_network_idle_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_stability_timeout_ms() -> u64 {
    10_000
}

fn default_network_idle_timeout_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    100
}

/// How a readiness wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageReadiness {
    /// False when the stability timeout cut the wait short
    pub stable: bool,
    pub waited: Duration,
    pub samples: u32,
}

/// Outcome of an action that may have changed the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaNavigation<T> {
    /// True when the URL after the action differs from the URL before it
    pub navigated: bool,
    pub new_url: String,
    /// What the action itself returned
    pub outcome: T,
    pub readiness: PageReadiness,
}

/// Waits until the DOM of `page` stops changing, or the stability timeout passes
///
/// Failed samples count as "still changing". Never returns an error.
pub async fn wait_for_page_ready<E>(
    engine: &E,
    page: &E::Page,
    options: &SpaOptions,
) -> PageReadiness
where
    E: BrowserEngine + ?Sized,
{
    let started = Instant::now();
    let deadline = started + Duration::from_millis(options.stability_timeout_ms);
    let idle = Duration::from_millis(options.network_idle_timeout_ms);
    let poll = Duration::from_millis(options.poll_interval_ms.max(1));

    let mut last: Option<u64> = None;
    let mut unchanged_since = started;
    let mut samples = 0u32;

    loop {
        let sample = evaluate_as::<E, u64>(engine, page, DOM_SIZE).await.ok();
        samples += 1;
        let now = Instant::now();

        match (sample, last) {
            (Some(size), Some(previous)) if size == previous => {
                if now.duration_since(unchanged_since) >= idle {
                    trace!("DOM stable at {} after {:?}", size, now.duration_since(started));
                    return PageReadiness {
                        stable: true,
                        waited: now.duration_since(started),
                        samples,
                    };
                }
            }
            _ => {
                trace!("DOM size sample {:?}", sample);
                last = sample;
                unchanged_since = now;
            }
        }

        if now >= deadline {
            return PageReadiness {
                stable: false,
                waited: now.duration_since(started),
                samples,
            };
        }

        sleep(poll.min(deadline - now)).await;
    }
}

/// Runs `action` and reports whether it moved the page to a new URL
///
/// Reads the URL, runs the action, waits for readiness and reads the URL
/// again. A page with no URL yet (nothing loaded) counts as navigated.
pub async fn detect_spa_navigation<E, F, Fut, T>(
    engine: &E,
    page: &E::Page,
    options: &SpaOptions,
    action: F,
) -> Result<SpaNavigation<T>, BrowserError>
where
    E: BrowserEngine + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, BrowserError>>,
{
    let before = engine.current_url(page).await.ok();
    let outcome = action().await?;
    let readiness = wait_for_page_ready(engine, page, options).await;
    let after = engine.current_url(page).await?;

    Ok(SpaNavigation {
        navigated: before.as_deref() != Some(after.as_str()),
        new_url: after,
        outcome,
        readiness,
    })
}
