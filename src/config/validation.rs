use crate::config::types::{ExplorationConfig, HttpConfig};
use crate::coverage::CoverageThresholds;
use crate::cycle::CycleConfig;
use crate::scope::validate_scope_config;
use crate::spa::SpaOptions;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &ExplorationConfig) -> Result<(), ConfigError> {
    validate_start_url(&config.start_url)?;
    validate_limits(config)?;
    validate_cycle_config(&config.cycle_config)?;
    if let Some(spa) = &config.spa_options {
        validate_spa_options(spa)?;
    }
    if let Some(thresholds) = &config.coverage_thresholds {
        validate_thresholds(thresholds)?;
    }
    validate_http_config(&config.http)?;

    let scope = validate_scope_config(&config.scope);
    if !scope.valid {
        return Err(ConfigError::InvalidPattern(scope.errors.join("; ")));
    }

    Ok(())
}

/// Validates the start URL: must parse, use HTTP(S), and carry a host
fn validate_start_url(start_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url '{}': {}", start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start-url '{}' must use http or https",
            start_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "start-url '{}' has no host",
            start_url
        )));
    }

    Ok(())
}

fn validate_limits(config: &ExplorationConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "timeout-ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_cycle_config(config: &CycleConfig) -> Result<(), ConfigError> {
    if config.parameterized_url_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "parameterized-url-limit must be >= 1, got {}",
            config.parameterized_url_limit
        )));
    }

    if config.infinite_scroll_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "infinite-scroll-threshold must be >= 1, got {}",
            config.infinite_scroll_threshold
        )));
    }

    Ok(())
}

fn validate_spa_options(options: &SpaOptions) -> Result<(), ConfigError> {
    if options.poll_interval_ms < 1 {
        return Err(ConfigError::Validation(
            "poll-interval-ms must be >= 1".to_string(),
        ));
    }

    if options.poll_interval_ms > options.stability_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "poll-interval-ms ({}) cannot exceed stability-timeout-ms ({})",
            options.poll_interval_ms, options.stability_timeout_ms
        )));
    }

    if options.network_idle_timeout_ms > options.stability_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "network-idle-timeout-ms ({}) cannot exceed stability-timeout-ms ({})",
            options.network_idle_timeout_ms, options.stability_timeout_ms
        )));
    }

    Ok(())
}

fn validate_thresholds(thresholds: &CoverageThresholds) -> Result<(), ConfigError> {
    let named = [
        ("page", thresholds.page),
        ("element", thresholds.element),
        ("path", thresholds.path),
    ];

    for (name, value) in named {
        if let Some(value) = value {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "coverage.{} must be between 0 and 100, got {}",
                    name, value
                )));
            }
        }
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "http.user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "http.request-timeout-ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}
