use serde::{Deserialize, Serialize};

/// Per-run crawl configuration, as described in spec §3/§6.
///
/// Five independently-mergeable sections (see [`crate::config::merge`]).
/// Every field carries the documented default so a freshly-created run
/// (before any `configure` call) behaves exactly as spec'd.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfig {
    pub rate_limiting: RateLimitingConfig,
    pub content_filtering: ContentFilteringConfig,
    pub crawl_behavior: CrawlBehaviorConfig,
    pub domain_scope: DomainScopeConfig,
    pub rendering: RenderingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rate_limiting: RateLimitingConfig::default(),
            content_filtering: ContentFilteringConfig::default(),
            crawl_behavior: CrawlBehaviorConfig::default(),
            domain_scope: DomainScopeConfig::default(),
            rendering: RenderingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitingConfig {
    pub min_domain_delay_ms: u64,
    pub max_domain_delay_ms: u64,
    pub error_backoff_multiplier: f64,
    pub jitter_factor: f64,
    pub max_concurrent_requests: u32,
    pub global_rate_limit_per_minute: u32,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            min_domain_delay_ms: 1000,
            max_domain_delay_ms: 60_000,
            error_backoff_multiplier: 2.0,
            jitter_factor: 0.1,
            max_concurrent_requests: 16,
            global_rate_limit_per_minute: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentFilteringConfig {
    pub max_content_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub skip_binary_files: bool,
    pub store_content: bool,
}

impl Default for ContentFilteringConfig {
    fn default() -> Self {
        Self {
            max_content_size_bytes: 10 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            skip_binary_files: true,
            store_content: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlBehaviorConfig {
    pub max_depth: u32,
    pub max_queue_size: usize,
    pub max_pages_per_run: u64,
    pub default_batch_size: u32,
    pub request_timeout_ms: u64,
    pub retry_count: u32,
    pub respect_robots_txt: bool,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub user_agent: String,
    pub follow_links: bool,
    pub same_domain_only: bool,
}

impl Default for CrawlBehaviorConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_queue_size: 100_000,
            max_pages_per_run: 0,
            default_batch_size: 10,
            request_timeout_ms: 30_000,
            retry_count: 3,
            respect_robots_txt: true,
            follow_redirects: true,
            max_redirects: 5,
            user_agent: "CloudflareCrawler/1.0".to_string(),
            follow_links: true,
            same_domain_only: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainScopeConfig {
    pub allowed_domains: Vec<String>,
    pub blocked_domains: Vec<String>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub include_subdomains: bool,
}

impl Default for DomainScopeConfig {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            blocked_domains: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            include_subdomains: true,
        }
    }
}

/// Rendering is an ambient config section the source format carries even
/// though JS rendering itself is out of scope (spec.md Non-goals). A worker
/// that understands rendering can read this projection; the coordinator
/// never acts on it beyond passing it through `configure`/storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderingConfig {
    pub js_rendering_enabled: bool,
    pub render_timeout_ms: u64,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            js_rendering_enabled: false,
            render_timeout_ms: 15_000,
        }
    }
}

/// Process-wide settings loaded once from a TOML file at startup. Distinct
/// from [`RunConfig`], which is per-run and mutated via `POST /configure`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessConfig {
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,

    #[serde(rename = "database-path")]
    pub database_path: String,

    #[serde(rename = "maintenance-tick-seconds", default = "default_tick_seconds")]
    pub maintenance_tick_seconds: u64,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_tick_seconds() -> u64 {
    60
}
