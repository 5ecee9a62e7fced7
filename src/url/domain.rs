use url::Url;

/// Extracts the lowercase host of a URL
///
/// Returns `None` for URLs without a host (`mailto:`, `data:` and friends).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use discovery_engine::url::extract_domain;
///
/// let url = Url::parse("https://App.Example.com:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("app.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the base domain used for scope decisions from a URL string
///
/// The host is lowercased and a leading `www.` is dropped so that
/// `www.example.com` and `example.com` describe the same application.
pub fn base_domain(url_str: &str) -> Option<String> {
    let url = Url::parse(url_str).ok()?;
    let host = extract_domain(&url)?;
    Some(strip_www(&host).to_string())
}

/// Removes a leading `www.` label
pub(crate) fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
