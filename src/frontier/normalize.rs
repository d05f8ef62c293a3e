//! URL normalization and the Visited Index hash (spec §4.1/§4.2).
//!
//! Deliberately narrower than a general-purpose normalizer: exactly the five
//! steps below, no more. In particular this does not upgrade `http` to
//! `https`, strip a `www.` prefix, or remove tracking query parameters —
//! those are crawler-specific policy choices outside what this coordinator's
//! admission contract promises.

use crate::UrlError;
use url::Url;

/// Normalizes a URL for admission and visited-lookup.
///
/// 1. Parse; reject if the scheme is not `http`/`https`.
/// 2. Lowercase the host.
/// 3. Strip the fragment.
/// 4. Strip a trailing `/` from the path (except the root).
/// 5. Sort query parameters lexicographically by key (repeated values and
///    their relative order for a given key are preserved).
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }

    Ok(url)
}

/// A 32-bit rolling multiply-add hash of the normalized URL string, used as
/// the Visited Index's fixed-width key. Deterministic and stable across
/// restarts; collisions cause under-crawling, never double-crawling, a
/// trade-off the spec explicitly accepts.
pub fn visited_hash(normalized: &Url) -> u32 {
    const PRIME: u32 = 16_777_619;
    let mut hash: u32 = 2_166_136_261;
    for byte in normalized.as_str().bytes() {
        hash = hash.wrapping_mul(PRIME) ^ u32::from(byte);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lowercases_host() {
        let url = normalize_url("https://EXAMPLE.com/Page").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Page");
    }

    #[test]
    fn strips_fragment() {
        let url = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn strips_trailing_slash_except_root() {
        let url = normalize_url("https://example.com/page/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");

        let root = normalize_url("https://example.com/").unwrap();
        assert_eq!(root.as_str(), "https://example.com/");
    }

    #[test]
    fn sorts_query_parameters() {
        let url = normalize_url("https://example.com/page?b=2&a=1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page?a=1&b=2");
    }

    #[test]
    fn does_not_strip_www_or_tracking_params() {
        let url = normalize_url("https://www.example.com/page?utm_source=x").unwrap();
        assert_eq!(url.as_str(), "https://www.example.com/page?utm_source=x");
    }

    #[test]
    fn does_not_force_https() {
        let url = normalize_url("http://example.com/page").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn equivalent_urls_normalize_identically() {
        let a = normalize_url("https://a.test/p1").unwrap();
        let b = normalize_url("https://A.test/p1").unwrap();
        let c = normalize_url("https://a.test/p1#x").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_url("https://Example.com/Page/?b=2&a=1#frag").unwrap();
        let twice = normalize_url(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn visited_hash_is_deterministic() {
        let url = normalize_url("https://example.com/page").unwrap();
        assert_eq!(visited_hash(&url), visited_hash(&url));
    }

    #[test]
    fn visited_hash_differs_for_different_urls() {
        let a = normalize_url("https://example.com/page-a").unwrap();
        let b = normalize_url("https://example.com/page-b").unwrap();
        assert_ne!(visited_hash(&a), visited_hash(&b));
    }

    fn path_segment() -> impl Strategy<Value = String> {
        "[a-z0-9]{1,8}"
    }

    fn query_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec(("[a-z]{1,4}", "[a-z0-9]{0,4}"), 0..4)
            .prop_map(|pairs| pairs.into_iter().map(|(k, v)| (k, v)).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        #[test]
        fn normalize_is_idempotent_over_generated_urls(
            host in "[a-z]{3,10}\\.test",
            segments in prop::collection::vec(path_segment(), 0..4),
            query in query_pairs(),
            fragment in "[a-zA-Z0-9]{0,6}",
        ) {
            let mut raw = format!("https://{host}/{}", segments.join("/"));
            if !query.is_empty() {
                let q: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
                raw.push('?');
                raw.push_str(&q.join("&"));
            }
            if !fragment.is_empty() {
                raw.push('#');
                raw.push_str(&fragment);
            }

            let once = normalize_url(&raw).unwrap();
            let twice = normalize_url(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn host_case_never_affects_the_hash(host in "[a-z]{3,10}\\.test") {
            let lower = normalize_url(&format!("https://{host}/p")).unwrap();
            let upper = normalize_url(&format!("https://{}/p", host.to_uppercase())).unwrap();
            prop_assert_eq!(visited_hash(&lower), visited_hash(&upper));
        }
    }
}
