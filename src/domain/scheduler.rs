//! Domain Scheduler (C3): turns the Frontier into a batch of URLs ready to
//! fetch *now*, respecting per-domain politeness and global pacing
//! (spec §4.3).

use crate::config::types::RateLimitingConfig;
use crate::domain::state::DomainState;
use crate::frontier::{Frontier, QueuedUrl, VisitedIndex};
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};

/// Applies jitter to `min_domain_delay_ms`, drawing a fresh random offset
/// per evaluation so dispatch never synchronizes across workers.
pub fn effective_min_delay_ms(min_domain_delay_ms: u64, jitter_factor: f64) -> u64 {
    if jitter_factor <= 0.0 {
        return min_domain_delay_ms;
    }
    let offset = rand::thread_rng().gen_range(-jitter_factor..=jitter_factor);
    let factor = (1.0 + offset).max(0.0);
    ((min_domain_delay_ms as f64) * factor).round() as u64
}

/// A 60-second sliding window of dispatch timestamps, enforcing
/// `globalRateLimitPerMinute` across all domains.
#[derive(Debug, Default, Clone)]
pub struct GlobalRateLimiter {
    timestamps: VecDeque<i64>,
}

const WINDOW_MS: i64 = 60_000;

impl GlobalRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn prune(&mut self, now_ms: i64) {
        while let Some(&front) = self.timestamps.front() {
            if now_ms - front >= WINDOW_MS {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// `true` if a dispatch is allowed right now under `limit_per_minute`
    /// (0 means unlimited).
    pub fn has_capacity(&mut self, now_ms: i64, limit_per_minute: u32) -> bool {
        if limit_per_minute == 0 {
            return true;
        }
        self.prune(now_ms);
        self.timestamps.len() < limit_per_minute as usize
    }

    pub fn record(&mut self, now_ms: i64) {
        self.timestamps.push_back(now_ms);
    }
}

/// Runs the dispatch algorithm's steps 3-6 (spec §4.3): the run-status check
/// (step 1) and the `maxPagesPerRun` completion check (step 2) are run-state
/// concerns owned by [`crate::coordinator`].
///
/// Inserts dispatched URLs into the Visited Index optimistically and updates
/// each dispatched domain's `lastFetchAt`/`requestCount` as it walks the
/// Frontier, so a URL never appears in more than one batch.
pub fn dispatch_batch(
    frontier: &mut Frontier,
    domain_states: &mut HashMap<String, DomainState>,
    visited: &mut VisitedIndex,
    rate_limiter: &mut GlobalRateLimiter,
    now_ms: i64,
    effective_batch: usize,
    rate_limiting: &RateLimitingConfig,
) -> Vec<QueuedUrl> {
    if !rate_limiter.has_capacity(now_ms, rate_limiting.global_rate_limit_per_minute) {
        return Vec::new();
    }

    let mut batched_domains: HashSet<String> = HashSet::new();

    let batch = frontier.take(effective_batch, |item| {
        if batched_domains.contains(&item.domain) {
            return false;
        }

        let delay = effective_min_delay_ms(
            rate_limiting.min_domain_delay_ms,
            rate_limiting.jitter_factor,
        ) as i64;

        let ready = domain_states
            .get(&item.domain)
            .map(|state| state.is_ready(now_ms, delay))
            .unwrap_or(true);

        if !ready {
            return false;
        }

        batched_domains.insert(item.domain.clone());
        domain_states
            .entry(item.domain.clone())
            .or_default()
            .record_dispatch(now_ms);
        visited.insert(crate::frontier::visited_hash(&item.url));
        rate_limiter.record(now_ms);

        true
    });

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontier::admit;

    fn rate_limiting() -> RateLimitingConfig {
        RateLimitingConfig {
            min_domain_delay_ms: 1000,
            max_domain_delay_ms: 60_000,
            error_backoff_multiplier: 2.0,
            jitter_factor: 0.0,
            max_concurrent_requests: 16,
            global_rate_limit_per_minute: 0,
        }
    }

    fn admit_all(frontier: &mut Frontier, visited: &VisitedIndex, urls: &[&str]) {
        let scope = crate::config::types::DomainScopeConfig::default();
        for (i, url) in urls.iter().enumerate() {
            admit(frontier, visited, url, 0, 0, 100 + i as i64, &scope, 10, 1000);
        }
    }

    #[test]
    fn dispatches_one_per_domain_per_batch() {
        let mut frontier = Frontier::new();
        let visited = VisitedIndex::new();
        admit_all(
            &mut frontier,
            &visited,
            &["https://a.test/p1", "https://a.test/p2", "https://b.test/p1"],
        );
        drop(visited);

        let mut visited = VisitedIndex::new();
        let mut domain_states = HashMap::new();
        let mut rate_limiter = GlobalRateLimiter::new();

        let batch = dispatch_batch(
            &mut frontier,
            &mut domain_states,
            &mut visited,
            &mut rate_limiter,
            1000,
            10,
            &rate_limiting(),
        );

        let domains: HashSet<&str> = batch.iter().map(|item| item.domain.as_str()).collect();
        assert_eq!(domains.len(), batch.len());
        assert_eq!(frontier.size(), 1);
    }

    #[test]
    fn respects_backoff() {
        let mut frontier = Frontier::new();
        let visited = VisitedIndex::new();
        admit_all(&mut frontier, &visited, &["https://x.test/p1"]);
        drop(visited);

        let mut visited = VisitedIndex::new();
        let mut domain_states = HashMap::new();
        domain_states
            .entry("x.test".to_string())
            .or_insert_with(DomainState::new)
            .record_error(500, 1000, 60_000, 2.0);
        let mut rate_limiter = GlobalRateLimiter::new();

        let batch = dispatch_batch(
            &mut frontier,
            &mut domain_states,
            &mut visited,
            &mut rate_limiter,
            1000,
            10,
            &rate_limiting(),
        );
        assert!(batch.is_empty());
    }

    #[test]
    fn global_rate_limit_blocks_without_mutation() {
        let mut frontier = Frontier::new();
        let visited = VisitedIndex::new();
        admit_all(&mut frontier, &visited, &["https://a.test/p1"]);
        drop(visited);

        let mut visited = VisitedIndex::new();
        let mut domain_states = HashMap::new();
        let mut rate_limiter = GlobalRateLimiter::new();
        rate_limiter.record(900);

        let mut config = rate_limiting();
        config.global_rate_limit_per_minute = 1;

        let batch = dispatch_batch(
            &mut frontier,
            &mut domain_states,
            &mut visited,
            &mut rate_limiter,
            1000,
            10,
            &config,
        );
        assert!(batch.is_empty());
        assert_eq!(frontier.size(), 1);
    }
}
