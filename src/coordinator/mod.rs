//! The Coordinator: the single object that owns a run's Frontier, Visited
//! Index, per-domain state, and run lifecycle (spec §2 C1-C5), and the
//! operations that mutate them.
//!
//! This struct holds no lock and does no I/O of its own; it is pure state +
//! logic. [`crate::registry`] is what gives each run's Coordinator the
//! single-writer property (spec §5) by pinning it inside one actor task, and
//! [`crate::persistence`] is what makes its mutations durable. Splitting the
//! two out keeps this module unit-testable without a database or a runtime.

mod dispatch;
mod maintenance;
mod projection;
mod report;

pub use dispatch::RequestWorkResult;
pub use maintenance::MaintenanceResult;
pub use projection::{DomainBreakdownEntry, StatsSnapshot, StatusSnapshot, WorkerConfig};
pub use report::ResultReport;

use crate::config::{self, RunConfig};
use crate::domain::{DomainState, GlobalRateLimiter};
use crate::frontier::{AdmitOutcome, Frontier, RejectReason, VisitedIndex};
use crate::persistence::Snapshot;
use crate::run::{RunState, RunStatus};
use crate::Result;
use std::collections::HashMap;

/// Outcome of a `POST /seed` call (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    pub admitted: u32,
    pub rejected: u32,
    pub rejections: Vec<(String, RejectReason)>,
    pub queue_size: usize,
}

pub struct Coordinator {
    pub run_id: String,
    frontier: Frontier,
    visited: VisitedIndex,
    domain_states: HashMap<String, DomainState>,
    rate_limiter: GlobalRateLimiter,
    run_state: RunState,
}

impl Coordinator {
    /// A brand-new run, never before persisted.
    pub fn new(run_id: String, now_ms: i64) -> Self {
        Self {
            run_id: run_id.clone(),
            frontier: Frontier::new(),
            visited: VisitedIndex::new(),
            domain_states: HashMap::new(),
            rate_limiter: GlobalRateLimiter::new(),
            run_state: RunState::new(run_id, now_ms),
        }
    }

    /// Hydrates a Coordinator from a persisted snapshot (spec §4.5).
    /// Hydration is idempotent and tolerates an absent run state (a run
    /// whose actor was spawned but never persisted): missing slots become
    /// the empty run created by [`Coordinator::new`].
    pub fn from_snapshot(run_id: String, snapshot: Snapshot, now_ms: i64) -> Self {
        let visited = VisitedIndex::from_hashes(snapshot.visited_urls.into_iter().collect());
        let frontier = Frontier::from_items(snapshot.pending_queue);
        let run_state = snapshot
            .run_state
            .map(|mut state| {
                state.recent_errors = crate::run::RecentErrorsRing::from_entries(
                    snapshot.recent_errors.clone(),
                );
                state
            })
            .unwrap_or_else(|| RunState::new(run_id.clone(), now_ms));

        Self {
            run_id,
            frontier,
            visited,
            domain_states: snapshot.domain_states,
            rate_limiter: GlobalRateLimiter::new(),
            run_state,
        }
    }

    /// The full five-slot snapshot (spec §4.5), ready for
    /// [`crate::persistence::Storage::save_snapshot`].
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            pending_queue: self.frontier.items().to_vec(),
            visited_urls: self.visited.as_hashes().iter().copied().collect(),
            domain_states: self.domain_states.clone(),
            run_state: Some(self.run_state.clone()),
            recent_errors: self.run_state.recent_errors.entries().clone(),
        }
    }

    pub fn status(&self) -> RunStatus {
        self.run_state.status
    }

    pub fn config(&self) -> &RunConfig {
        &self.run_state.config
    }

    /// Full admission pipeline for a batch of seed URLs (`POST /seed`,
    /// spec §4.1).
    pub fn seed(&mut self, urls: &[String], depth: u32, priority: i64, now_ms: i64) -> SeedOutcome {
        let mut admitted = 0u32;
        let mut rejected = 0u32;
        let mut rejections = Vec::new();

        let scope = self.run_state.config.domain_scope.clone();
        let max_depth = self.run_state.config.crawl_behavior.max_depth;
        let max_queue_size = self.run_state.config.crawl_behavior.max_queue_size;

        for url in urls {
            match crate::frontier::admit(
                &mut self.frontier,
                &self.visited,
                url,
                depth,
                priority,
                now_ms,
                &scope,
                max_depth,
                max_queue_size,
            ) {
                AdmitOutcome::Admitted(_) => {
                    admitted += 1;
                    self.run_state.stats.urls_queued += 1;
                }
                AdmitOutcome::Rejected(reason) => {
                    rejected += 1;
                    rejections.push((url.clone(), reason));
                }
            }
        }

        self.run_state.touch(now_ms);

        SeedOutcome {
            admitted,
            rejected,
            rejections,
            queue_size: self.frontier.size(),
        }
    }

    /// Merges a partial `POST /configure` payload and validates the result
    /// before committing it (spec §4/§9: per-section shallow merge).
    ///
    /// `base`, when given, is merged against instead of the run's current
    /// config — the HTTP layer uses this to let an operator configure a run
    /// starting from a previously-registered named preset (`configId` in
    /// the request) rather than always building on whatever the run
    /// already has. Also mints the resulting config's content-hash id into
    /// `run_state.config_id`, which `GET /status`'s `config:{id,name}`
    /// projection reads back.
    pub fn configure(
        &mut self,
        base: Option<&RunConfig>,
        patch: &serde_json::Value,
        now_ms: i64,
    ) -> Result<()> {
        let base = base.unwrap_or(&self.run_state.config);
        let merged = config::merge_run_config(base, patch)?;
        config::validate(&merged)?;
        self.run_state.config_id = Some(config::compute_run_config_hash(&merged));
        self.run_state.config = merged;
        self.run_state.touch(now_ms);
        Ok(())
    }

    pub fn start(&mut self, now_ms: i64) -> Result<()> {
        self.run_state.start(now_ms)
    }

    pub fn pause(&mut self, now_ms: i64) -> Result<()> {
        self.run_state.pause(now_ms)
    }

    pub fn resume(&mut self, now_ms: i64) -> Result<()> {
        self.run_state.resume(now_ms)
    }

    pub fn cancel(&mut self, now_ms: i64) -> Result<()> {
        self.run_state.cancel(now_ms)
    }

    /// Clears the Frontier, Visited Index, Domain States and Recent Errors
    /// Ring and returns the run to `pending` (spec §4.4). Orthogonal to the
    /// other transitions: valid from any state.
    pub fn reset(&mut self, now_ms: i64) {
        self.frontier.clear();
        self.visited.clear();
        self.domain_states.clear();
        self.run_state.reset(now_ms);
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_admits_and_counts_duplicates() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        let outcome = coordinator.seed(
            &[
                "https://a.test/p1".to_string(),
                "https://B.test/P1/".to_string(),
                "https://a.test/p1#x".to_string(),
            ],
            0,
            0,
            1000,
        );
        assert_eq!(outcome.admitted, 2);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(outcome.queue_size, 2);
    }

    #[test]
    fn reset_clears_all_run_scoped_state() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        coordinator.seed(&["https://a.test/p1".to_string()], 0, 0, 1000);
        coordinator.start(1000).unwrap();
        coordinator.reset(2000);
        assert_eq!(coordinator.status(), RunStatus::Pending);
        assert_eq!(coordinator.frontier_size(), 0);
    }

    #[test]
    fn snapshot_roundtrips_through_hydration() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        coordinator.seed(&["https://a.test/p1".to_string()], 0, 0, 1000);
        let snapshot = coordinator.to_snapshot();

        let rehydrated = Coordinator::from_snapshot("r1".to_string(), snapshot, 2000);
        assert_eq!(rehydrated.frontier_size(), 1);
        assert_eq!(rehydrated.status(), RunStatus::Pending);
    }
}
