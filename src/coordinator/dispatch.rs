//! `request-work` (spec §4.3, steps 1-6): turns run status, `maxPagesPerRun`,
//! and the Domain Scheduler's dispatch decision into a batch for a worker.

use super::projection::WorkerConfig;
use crate::coordinator::Coordinator;
use crate::domain::dispatch_batch;
use crate::frontier::QueuedUrl;
use crate::run::RunStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct RequestWorkResult {
    pub urls: Vec<QueuedUrl>,
    pub queue_size: usize,
    pub config: WorkerConfig,
}

const MAX_BATCH_SIZE: u32 = 100;

impl Coordinator {
    /// Steps 1-6 of the dispatch algorithm. Step 1 (not-running guard) and
    /// step 2 (`maxPagesPerRun` completion) are run-state concerns that
    /// belong here rather than in [`crate::domain::scheduler`], which only
    /// owns the Frontier/Domain-State walk of steps 3-6.
    pub fn request_work(&mut self, batch_size: Option<u32>, now_ms: i64) -> RequestWorkResult {
        let worker_config = self.worker_config();

        // Step 1: not running -> empty batch, no mutation.
        if self.status() != RunStatus::Running {
            return RequestWorkResult {
                urls: Vec::new(),
                queue_size: self.frontier_size(),
                config: worker_config,
            };
        }

        // Step 2: maxPagesPerRun reached -> auto-complete, empty batch.
        let max_pages = self.run_state.config.crawl_behavior.max_pages_per_run;
        if max_pages > 0 && self.run_state.stats.urls_fetched >= max_pages {
            self.run_state.complete(now_ms);
            return RequestWorkResult {
                urls: Vec::new(),
                queue_size: self.frontier_size(),
                config: worker_config,
            };
        }

        // Step 3: effective batch size.
        let effective_batch = batch_size
            .unwrap_or(self.run_state.config.crawl_behavior.default_batch_size)
            .min(MAX_BATCH_SIZE) as usize;

        // Steps 4-5: walk the Frontier once, partitioning into batch/remaining.
        let batch = dispatch_batch(
            &mut self.frontier,
            &mut self.domain_states,
            &mut self.visited,
            &mut self.rate_limiter,
            now_ms,
            effective_batch,
            &self.run_state.config.rate_limiting,
        );

        // Step 5 continued: auto-complete when both batch and remaining
        // frontier are empty.
        if batch.is_empty() && self.frontier.is_empty() {
            self.run_state.complete(now_ms);
        } else {
            self.run_state.touch(now_ms);
        }

        RequestWorkResult {
            urls: batch,
            queue_size: self.frontier_size(),
            config: worker_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_queue_dispatch_completes_the_run() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        coordinator.start(0).unwrap();
        let result = coordinator.request_work(Some(5), 1000);
        assert!(result.urls.is_empty());
        assert_eq!(result.queue_size, 0);
        assert_eq!(coordinator.status(), RunStatus::Completed);
    }

    #[test]
    fn not_running_returns_empty_batch_without_mutation() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        coordinator.seed(&["https://a.test/p1".to_string()], 0, 0, 0);
        let result = coordinator.request_work(Some(5), 1000);
        assert!(result.urls.is_empty());
        assert_eq!(coordinator.frontier_size(), 1);
    }

    #[test]
    fn basic_admit_and_dispatch() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        coordinator.seed(
            &[
                "https://a.test/p1".to_string(),
                "https://B.test/P1/".to_string(),
                "https://a.test/p1#x".to_string(),
            ],
            0,
            0,
            0,
        );
        coordinator.start(0).unwrap();

        let result = coordinator.request_work(Some(10), 0);
        assert_eq!(result.urls.len(), 2);
        assert_eq!(result.queue_size, 0);

        let domains: std::collections::HashSet<&str> =
            result.urls.iter().map(|u| u.domain.as_str()).collect();
        assert_eq!(domains, ["a.test", "b.test"].into_iter().collect());
    }

    #[test]
    fn politeness_blocks_immediate_redispatch() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        coordinator.seed(
            &["https://a.test/p1".to_string(), "https://b.test/p1".to_string()],
            0,
            0,
            0,
        );
        coordinator.start(0).unwrap();
        coordinator.request_work(Some(10), 0);

        let second = coordinator.request_work(Some(10), 0);
        assert!(second.urls.is_empty());
        assert_eq!(second.queue_size, 0);
    }

    #[test]
    fn max_pages_per_run_completes_without_dispatch() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        coordinator.seed(&["https://a.test/p1".to_string()], 0, 0, 0);
        coordinator
            .configure(None, &serde_json::json!({"crawlBehavior": {"maxPagesPerRun": 1}}), 0)
            .unwrap();
        coordinator.start(0).unwrap();
        coordinator.run_state.stats.urls_fetched = 1;

        let result = coordinator.request_work(Some(10), 1000);
        assert!(result.urls.is_empty());
        assert_eq!(coordinator.status(), RunStatus::Completed);
    }

    #[test]
    fn batch_size_is_capped_at_one_hundred() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        for i in 0..150 {
            coordinator.seed(&[format!("https://host{i}.test/p")], 0, 0, 0);
        }
        coordinator.start(0).unwrap();
        let result = coordinator.request_work(Some(500), 0);
        assert_eq!(result.urls.len(), 100);
    }
}
