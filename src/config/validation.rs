//! Field-range validation for [`RunConfig`](crate::config::types::RunConfig).
//!
//! Applied once at run creation and again after every `configure` merge, so
//! a bad patch is rejected before it ever reaches the run's state.

use crate::config::types::{
    ContentFilteringConfig, CrawlBehaviorConfig, DomainScopeConfig, RateLimitingConfig, RunConfig,
};
use crate::ConfigError;
use regex::Regex;

/// Validates every section of a [`RunConfig`].
pub fn validate(config: &RunConfig) -> Result<(), ConfigError> {
    validate_rate_limiting(&config.rate_limiting)?;
    validate_content_filtering(&config.content_filtering)?;
    validate_crawl_behavior(&config.crawl_behavior)?;
    validate_domain_scope(&config.domain_scope)?;
    Ok(())
}

fn validate_rate_limiting(config: &RateLimitingConfig) -> Result<(), ConfigError> {
    if config.min_domain_delay_ms > config.max_domain_delay_ms {
        return Err(ConfigError::Validation(format!(
            "minDomainDelayMs ({}) cannot exceed maxDomainDelayMs ({})",
            config.min_domain_delay_ms, config.max_domain_delay_ms
        )));
    }

    if config.error_backoff_multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "errorBackoffMultiplier must be >= 1.0, got {}",
            config.error_backoff_multiplier
        )));
    }

    if !(0.0..=1.0).contains(&config.jitter_factor) {
        return Err(ConfigError::Validation(format!(
            "jitterFactor must be between 0.0 and 1.0, got {}",
            config.jitter_factor
        )));
    }

    if config.max_concurrent_requests < 1 {
        return Err(ConfigError::Validation(
            "maxConcurrentRequests must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_content_filtering(config: &ContentFilteringConfig) -> Result<(), ConfigError> {
    if config.max_content_size_bytes == 0 {
        return Err(ConfigError::Validation(
            "maxContentSizeBytes must be > 0".to_string(),
        ));
    }

    if config.allowed_content_types.iter().any(|t| t.is_empty()) {
        return Err(ConfigError::Validation(
            "allowedContentTypes entries cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawl_behavior(config: &CrawlBehaviorConfig) -> Result<(), ConfigError> {
    if config.default_batch_size < 1 {
        return Err(ConfigError::Validation(
            "defaultBatchSize must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "requestTimeoutMs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "userAgent cannot be empty".to_string(),
        ));
    }

    // maxQueueSize == 0 means unbounded (spec §3); maxPagesPerRun == 0 means
    // unlimited. Neither is rejected.

    Ok(())
}

fn validate_domain_scope(config: &DomainScopeConfig) -> Result<(), ConfigError> {
    for pattern in &config.include_patterns {
        validate_regex_pattern(pattern)?;
    }
    for pattern in &config.exclude_patterns {
        validate_regex_pattern(pattern)?;
    }
    for domain in config
        .allowed_domains
        .iter()
        .chain(config.blocked_domains.iter())
    {
        validate_domain_pattern(domain)?;
    }
    Ok(())
}

fn validate_regex_pattern(pattern: &str) -> Result<(), ConfigError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("invalid regex '{pattern}': {e}")))
}

/// Validates a domain pattern, supporting a single leading `*.` wildcard
/// (e.g. `*.example.com`), matching the matcher in
/// [`crate::domain::scope`].
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "domain pattern cannot be empty".to_string(),
        ));
    }

    let bare = pattern.strip_prefix("*.").unwrap_or(pattern);

    if bare.is_empty()
        || bare.starts_with('.')
        || bare.ends_with('.')
        || bare.contains("..")
        || !bare.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "invalid domain pattern: '{pattern}'"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&RunConfig::default()).is_ok());
    }

    #[test]
    fn min_delay_above_max_delay_rejected() {
        let mut config = RunConfig::default();
        config.rate_limiting.min_domain_delay_ms = 10_000;
        config.rate_limiting.max_domain_delay_ms = 1_000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn jitter_factor_out_of_range_rejected() {
        let mut config = RunConfig::default();
        config.rate_limiting.jitter_factor = 1.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn invalid_regex_pattern_rejected() {
        let mut config = RunConfig::default();
        config.domain_scope.include_patterns = vec!["[unclosed".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn wildcard_domain_pattern_accepted() {
        let mut config = RunConfig::default();
        config.domain_scope.allowed_domains = vec!["*.example.com".to_string()];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn malformed_domain_pattern_rejected() {
        let mut config = RunConfig::default();
        config.domain_scope.blocked_domains = vec![".bad..domain".to_string()];
        assert!(validate(&config).is_err());
    }
}
