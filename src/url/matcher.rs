use crate::url::domain::strip_www;

/// Checks whether a host belongs to the application rooted at `base_domain`
///
/// A host is internal when, ignoring a leading `www.`, it is the base domain
/// itself or any subdomain of it:
///
/// - `example.com` matches `example.com` and `www.example.com`
/// - `example.com` matches `api.example.com` and `a.b.example.com`
/// - `example.com` does not match `myexample.com` or `example.com.evil.org`
///
/// Both arguments are expected to be lowercase.
///
/// # Examples
///
/// ```
/// use discovery_engine::url::is_same_site;
///
/// assert!(is_same_site("www.example.com", "example.com"));
/// assert!(is_same_site("docs.example.com", "example.com"));
/// assert!(!is_same_site("example.org", "example.com"));
/// ```
pub fn is_same_site(host: &str, base_domain: &str) -> bool {
    let host = strip_www(host);
    let base = strip_www(base_domain);

    if host.is_empty() || base.is_empty() {
        return false;
    }

    host == base || host.ends_with(&format!(".{}", base))
}
