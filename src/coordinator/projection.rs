//! Read-only projections served to workers and operators: the worker
//! configuration projection (spec §4.5), `GET /stats`, and `GET /status`
//! (spec §6).

use crate::coordinator::Coordinator;
use serde::{Deserialize, Serialize};

/// The subset of `RunConfig` a worker needs to execute a batch safely
/// (spec §4.5). Attached to every `request-work` response so a worker never
/// needs a separate round trip to learn policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    pub request_timeout_ms: u64,
    pub respect_robots_txt: bool,
    pub user_agent: String,
    pub custom_headers: std::collections::HashMap<String, String>,
    pub max_content_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub store_content: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainBreakdownEntry {
    pub domain: String,
    pub request_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub avg_response_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub run_id: String,
    pub status: crate::run::RunStatus,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub stats: crate::run::Stats,
    pub progress: crate::run::Progress,
    pub domain_breakdown: Vec<DomainBreakdownEntry>,
    pub recent_errors: Vec<crate::run::RecentError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub status: crate::run::RunStatus,
    pub queue_size: usize,
    pub visited_count: usize,
    pub domains_tracked: usize,
    pub config_id: Option<String>,
}

impl Coordinator {
    /// `workerConfig()` (spec §4.5).
    pub fn worker_config(&self) -> WorkerConfig {
        let c = &self.run_state.config;
        WorkerConfig {
            request_timeout_ms: c.crawl_behavior.request_timeout_ms,
            respect_robots_txt: c.crawl_behavior.respect_robots_txt,
            user_agent: c.crawl_behavior.user_agent.clone(),
            custom_headers: std::collections::HashMap::new(),
            max_content_size_bytes: c.content_filtering.max_content_size_bytes,
            allowed_content_types: c.content_filtering.allowed_content_types.clone(),
            follow_redirects: c.crawl_behavior.follow_redirects,
            max_redirects: c.crawl_behavior.max_redirects,
            store_content: c.content_filtering.store_content,
        }
    }

    /// `GET /stats` (spec §6), with `domainBreakdown` capped at 50 entries
    /// (spec §6's `domainBreakdown[≤50]`), largest request count first.
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        let mut breakdown: Vec<DomainBreakdownEntry> = self
            .domain_states
            .iter()
            .map(|(domain, state)| DomainBreakdownEntry {
                domain: domain.clone(),
                request_count: state.request_count,
                success_count: state.success_count,
                error_count: state.error_count,
                avg_response_time_ms: state.avg_response_time_ms(),
            })
            .collect();
        breakdown.sort_by(|a, b| b.request_count.cmp(&a.request_count));
        breakdown.truncate(50);

        StatsSnapshot {
            run_id: self.run_id.clone(),
            status: self.run_state.status,
            started_at: self.run_state.started_at,
            completed_at: self.run_state.completed_at,
            stats: self.run_state.stats.clone(),
            progress: self.run_state.progress.clone(),
            domain_breakdown: breakdown,
            recent_errors: self.run_state.recent_errors.entries().iter().cloned().collect(),
        }
    }

    /// `GET /status` (spec §6).
    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.run_state.status,
            queue_size: self.frontier_size(),
            visited_count: self.visited.len(),
            domains_tracked: self.domain_states.len(),
            config_id: self.run_state.config_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_breakdown_is_capped_at_fifty() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        for i in 0..60 {
            coordinator.seed(&[format!("https://host{i}.test/p")], 0, 0, 0);
        }
        coordinator.start(0).unwrap();
        coordinator.request_work(Some(100), 0);

        let snapshot = coordinator.stats_snapshot();
        assert!(snapshot.domain_breakdown.len() <= 50);
    }

    #[test]
    fn worker_config_reflects_run_config() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        coordinator
            .configure(None, &serde_json::json!({"crawlBehavior": {"userAgent": "TestBot/2.0"}}), 0)
            .unwrap();
        assert_eq!(coordinator.worker_config().user_agent, "TestBot/2.0");
    }
}
