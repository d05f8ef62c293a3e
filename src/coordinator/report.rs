//! `report-result` (spec §4.3): folds a worker's fetch outcome into Domain
//! State, run statistics, the Recent Errors Ring, and (when `followLinks`)
//! admits newly discovered URLs.

use crate::coordinator::Coordinator;
use crate::domain::DomainState;
use crate::frontier::AdmitOutcome;
use crate::run::RecentError;

/// A `POST /report-result` body (spec §6), plus `depth` — the depth
/// recorded on the dispatched work item, echoed back by the worker. The
/// source's bug (discovered links always treated as depth-0 children) is
/// fixed by requiring this field rather than assuming it (spec §9).
#[derive(Debug, Clone)]
pub struct ResultReport {
    pub url: String,
    pub depth: u32,
    pub status: Option<u16>,
    pub error: Option<String>,
    pub content_hash: Option<String>,
    pub content_size: Option<u64>,
    pub response_time_ms: Option<u64>,
    pub discovered_urls: Vec<String>,
}

impl ResultReport {
    fn is_failure(&self) -> bool {
        self.error.is_some() || self.status.map(|s| s >= 400).unwrap_or(false)
    }
}

impl Coordinator {
    pub fn report_result(&mut self, report: ResultReport, now_ms: i64) {
        let domain = crate::frontier::normalize_url(&report.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_else(|| report.url.clone());

        let rate_limiting = self.run_state.config.rate_limiting.clone();
        let state = self.domain_states.entry(domain.clone()).or_insert_with(DomainState::new);

        if report.is_failure() {
            state.record_error(
                now_ms,
                rate_limiting.min_domain_delay_ms,
                rate_limiting.max_domain_delay_ms,
                rate_limiting.error_backoff_multiplier,
            );
            self.run_state.stats.record_failure();
            self.run_state.recent_errors.push(RecentError {
                url: report.url.clone(),
                domain: domain.clone(),
                status_code: report.status,
                message: report
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("http status {}", report.status.unwrap_or(0))),
                timestamp: now_ms,
            });
        } else {
            state.record_success_reset();
            state.record_success(
                report.response_time_ms.unwrap_or(0),
                report.content_size.unwrap_or(0),
            );
            self.run_state.stats.record_success(
                report.response_time_ms.unwrap_or(0),
                report.content_size.unwrap_or(0),
            );
        }

        let follow_links = self.run_state.config.crawl_behavior.follow_links;
        let same_domain_only = self.run_state.config.crawl_behavior.same_domain_only;

        if follow_links && !report.discovered_urls.is_empty() {
            let scope = self.run_state.config.domain_scope.clone();
            let max_depth = self.run_state.config.crawl_behavior.max_depth;
            let max_queue_size = self.run_state.config.crawl_behavior.max_queue_size;
            let child_depth = report.depth + 1;
            let priority = -(child_depth as i64);

            for discovered in &report.discovered_urls {
                if same_domain_only {
                    let discovered_domain = crate::frontier::normalize_url(discovered)
                        .ok()
                        .and_then(|u| u.host_str().map(|h| h.to_string()));
                    if discovered_domain.as_deref() != Some(domain.as_str()) {
                        continue;
                    }
                }

                if let AdmitOutcome::Admitted(_) = crate::frontier::admit(
                    &mut self.frontier,
                    &self.visited,
                    discovered,
                    child_depth,
                    priority,
                    now_ms,
                    &scope,
                    max_depth,
                    max_queue_size,
                ) {
                    self.run_state.stats.urls_queued += 1;
                }
            }
        }

        self.run_state
            .stats
            .recompute_pages_per_minute(now_ms, self.run_state.started_at);
        self.run_state
            .progress
            .recompute(&self.run_state.stats, self.frontier.size());
        self.run_state.touch(now_ms);
    }
}
