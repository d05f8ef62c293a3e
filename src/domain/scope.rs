//! Domain scope checks applied during admission (spec §4.1, reasons c/d):
//! allowed/blocked domain lists (supporting a single leading `*.` wildcard)
//! and include/exclude regex over the full URL.

use crate::config::types::DomainScopeConfig;
use regex::Regex;

/// Why a URL failed the scope check, for diagnostics in a rejection reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRejection {
    DomainBlocked,
    DomainNotAllowed,
    ExcludePatternMatched,
    IncludePatternNotMatched,
}

/// Returns `Ok(())` if `url`/`domain` is within `scope`, otherwise the
/// reason it was rejected.
pub fn check_scope(scope: &DomainScopeConfig, domain: &str, url: &str) -> Result<(), ScopeRejection> {
    if scope
        .blocked_domains
        .iter()
        .any(|pattern| matches_domain(pattern, domain, scope.include_subdomains))
    {
        return Err(ScopeRejection::DomainBlocked);
    }

    if !scope.allowed_domains.is_empty()
        && !scope
            .allowed_domains
            .iter()
            .any(|pattern| matches_domain(pattern, domain, scope.include_subdomains))
    {
        return Err(ScopeRejection::DomainNotAllowed);
    }

    for pattern in &scope.exclude_patterns {
        if Regex::new(pattern).is_ok_and(|re| re.is_match(url)) {
            return Err(ScopeRejection::ExcludePatternMatched);
        }
    }

    if !scope.include_patterns.is_empty() {
        let matched = scope
            .include_patterns
            .iter()
            .any(|pattern| Regex::new(pattern).is_ok_and(|re| re.is_match(url)));
        if !matched {
            return Err(ScopeRejection::IncludePatternNotMatched);
        }
    }

    Ok(())
}

/// Matches a domain pattern, optionally prefixed with `*.` to also match any
/// subdomain of the base regardless of `include_subdomains`. A bare pattern
/// (no `*.` prefix) also matches subdomains of itself when
/// `include_subdomains` is set (spec §6 default `includeSubdomains=true`).
pub fn matches_domain(pattern: &str, candidate: &str, include_subdomains: bool) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        return candidate == base || candidate.ends_with(&format!(".{base}"));
    }

    candidate == pattern
        || (include_subdomains && candidate.ends_with(&format!(".{pattern}")))
}
