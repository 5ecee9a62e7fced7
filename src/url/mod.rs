//! URL handling module
//!
//! This module provides URL normalization, domain extraction and same-site
//! matching used by the cycle detector and the scope filter.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{base_domain, extract_domain};
pub use matcher::is_same_site;
pub use normalize::{normalize_url, TRACKING_PARAMS};

use ::url::Url;

/// Resolves a possibly relative link against the page it was found on
///
/// Returns `None` for links that cannot be navigated to:
/// - empty hrefs and fragment-only anchors (`#section`)
/// - `javascript:`, `mailto:`, `tel:` and `data:` schemes
/// - anything that does not resolve to an HTTP(S) URL
///
/// # Examples
///
/// ```
/// use discovery_engine::url::resolve_link;
///
/// let resolved = resolve_link("../pricing", "https://example.com/docs/intro");
/// assert_eq!(resolved.as_deref(), Some("https://example.com/pricing"));
/// assert_eq!(resolve_link("javascript:void(0)", "https://example.com/"), None);
/// ```
pub fn resolve_link(href: &str, base_url: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let base = Url::parse(base_url).ok()?;
    let absolute = base.join(href).ok()?;

    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute.to_string())
    } else {
        None
    }
}
