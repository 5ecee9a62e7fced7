//! URL boundary enforcement
//!
//! The scope decides which URLs an exploration may visit. Decisions are made
//! in a fixed order:
//!
//! 1. the URL must parse (`"Invalid URL"` otherwise)
//! 2. external hosts are denied unless `allow-external-domains` is set
//! 3. query parameters whose key matches an exclude pattern are stripped
//! 4. deny patterns are evaluated first and always win
//! 5. an empty allow list admits everything left; otherwise one allow pattern must match
//!
//! Patterns are regular expressions matched against the full URL string.

use crate::url::is_same_site;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Scope settings as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// URL must match at least one of these (when non-empty)
    #[serde(rename = "allow-patterns", default)]
    pub allow_patterns: Vec<String>,

    /// URL must match none of these
    #[serde(rename = "deny-patterns", default)]
    pub deny_patterns: Vec<String>,

    /// Follow links to hosts outside the start URL's site
    #[serde(rename = "allow-external-domains", default)]
    pub allow_external_domains: bool,

    /// Query parameter keys to drop before matching
    #[serde(rename = "exclude-query-patterns", default)]
    pub exclude_query_patterns: Vec<String>,
}

/// Outcome of a scope check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDecision {
    pub allowed: bool,
    /// Why the URL was denied; `None` when allowed
    pub reason: Option<String>,
}

impl ScopeDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Result of validating every pattern of a `ScopeConfig`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// A `ScopeConfig` with all patterns compiled
#[derive(Debug, Clone)]
pub struct CompiledScope {
    allow: Vec<Regex>,
    deny: Vec<Regex>,
    exclude_query: Vec<Regex>,
    allow_external_domains: bool,
}

impl CompiledScope {
    /// Compiles every pattern of `config`
    ///
    /// # Returns
    ///
    /// The compiled scope, or every compilation error found across the three lists
    pub fn compile(config: &ScopeConfig) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let allow = compile_list("allow", &config.allow_patterns, &mut errors);
        let deny = compile_list("deny", &config.deny_patterns, &mut errors);
        let exclude_query =
            compile_list("exclude-query", &config.exclude_query_patterns, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            allow,
            deny,
            exclude_query,
            allow_external_domains: config.allow_external_domains,
        })
    }

    /// Checks a URL against this scope
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to check
    /// * `base_domain` - Site of the start URL (see `crate::url::base_domain`)
    pub fn is_url_allowed(&self, url: &str, base_domain: &str) -> ScopeDecision {
        let Ok(parsed) = Url::parse(url) else {
            return ScopeDecision::deny("Invalid URL");
        };

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return ScopeDecision::deny(format!("Unsupported scheme: {}", parsed.scheme()));
        }

        let Some(host) = parsed.host_str() else {
            return ScopeDecision::deny("Invalid URL");
        };

        if !self.allow_external_domains && !is_same_site(&host.to_lowercase(), base_domain) {
            return ScopeDecision::deny(format!("External domain: {}", host));
        }

        let candidate = self.strip_excluded_params(parsed);

        if let Some(pattern) = self.deny.iter().find(|re| re.is_match(&candidate)) {
            return ScopeDecision::deny(format!("Matched deny pattern: {}", pattern.as_str()));
        }

        if self.allow.is_empty() || self.allow.iter().any(|re| re.is_match(&candidate)) {
            ScopeDecision::allow()
        } else {
            ScopeDecision::deny("No allow pattern matched")
        }
    }

    fn strip_excluded_params(&self, mut url: Url) -> String {
        if self.exclude_query.is_empty() || url.query().is_none() {
            return url.to_string();
        }

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !self.exclude_query.iter().any(|re| re.is_match(key)))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }

        url.to_string()
    }
}

fn compile_list(list: &str, patterns: &[String], errors: &mut Vec<String>) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                errors.push(format!("Invalid {} pattern '{}': {}", list, pattern, e));
                None
            }
        })
        .collect()
}

/// Checks a URL against a scope config
///
/// Compiles the patterns on every call; the orchestrator uses `CompiledScope`
/// directly. Invalid patterns deny the URL.
pub fn is_url_allowed(url: &str, config: &ScopeConfig, base_domain: &str) -> ScopeDecision {
    match CompiledScope::compile(config) {
        Ok(scope) => scope.is_url_allowed(url, base_domain),
        Err(errors) => ScopeDecision::deny(format!(
            "Invalid scope configuration: {}",
            errors.join("; ")
        )),
    }
}

/// Compiles every pattern in all three lists, collecting every error
pub fn validate_scope_config(config: &ScopeConfig) -> ScopeValidation {
    match CompiledScope::compile(config) {
        Ok(_) => ScopeValidation {
            valid: true,
            errors: Vec::new(),
        },
        Err(errors) => ScopeValidation {
            valid: false,
            errors,
        },
    }
}
