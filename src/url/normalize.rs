use url::Url;

/// Query parameters removed during normalization
pub const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
];

/// Normalizes a URL so that equivalent addresses compare equal
///
/// # Normalization Steps
///
/// 1. Parse the URL; malformed input is returned unchanged
/// 2. Lowercase the scheme and host (done by the parser)
/// 3. Strip trailing slashes unless the path is exactly `/`
/// 4. Remove tracking query parameters
/// 5. Sort remaining query parameters by key (stable for repeated keys)
/// 6. Remove an empty query string and the fragment
///
/// Every step is idempotent, so `normalize_url(normalize_url(u)) == normalize_url(u)`.
///
/// # Examples
///
/// ```
/// use discovery_engine::url::normalize_url;
///
/// let url = normalize_url("HTTPS://Example.COM/Cart/?b=2&utm_source=x&a=1#top");
/// assert_eq!(url, "https://example.com/Cart?a=1&b=2");
///
/// assert_eq!(normalize_url("not a url"), "not a url");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return url_str.to_string(),
    };

    if url.cannot_be_a_base() {
        return url_str.to_string();
    }

    let path = url.path().to_string();
    if path != "/" && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        url.set_path(if trimmed.is_empty() { "/" } else { trimmed });
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    url.to_string()
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key)
}
