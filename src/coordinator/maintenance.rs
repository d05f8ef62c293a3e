//! Maintenance tick (spec §4.5): clears expired backoffs, evicts idle
//! Domain State, and records a stalled-run warning. Operation-free — no
//! Frontier/Visited Index mutation, just housekeeping over Domain State and
//! Run State.

use crate::coordinator::Coordinator;

const IDLE_EVICTION_MS: i64 = 60 * 60 * 1000;
const STALL_THRESHOLD_MS: i64 = 30 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceResult {
    pub queue_size: usize,
}

impl Coordinator {
    pub fn on_cron(&mut self, now_ms: i64) -> MaintenanceResult {
        for state in self.domain_states.values_mut() {
            if let Some(backoff_until) = state.backoff_until {
                if backoff_until <= now_ms {
                    state.backoff_until = None;
                }
            }
        }

        self.domain_states.retain(|_, state| {
            let idle = state
                .last_fetch_at
                .map(|last| now_ms - last > IDLE_EVICTION_MS)
                .unwrap_or(false);
            !(idle && state.request_count == 0)
        });

        self.run_state.check_stalled(now_ms, STALL_THRESHOLD_MS);

        MaintenanceResult {
            queue_size: self.frontier_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainState;

    #[test]
    fn clears_elapsed_backoff() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        let mut state = DomainState::new();
        state.backoff_until = Some(500);
        coordinator.domain_states.insert("a.test".to_string(), state);

        coordinator.on_cron(1000);
        assert!(coordinator.domain_states["a.test"].backoff_until.is_none());
    }

    #[test]
    fn evicts_idle_untouched_domain() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        let mut state = DomainState::new();
        state.last_fetch_at = Some(0);
        coordinator.domain_states.insert("a.test".to_string(), state);

        coordinator.on_cron(IDLE_EVICTION_MS + 1);
        assert!(!coordinator.domain_states.contains_key("a.test"));
    }

    #[test]
    fn keeps_idle_domain_with_requests() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        let mut state = DomainState::new();
        state.last_fetch_at = Some(0);
        state.request_count = 3;
        coordinator.domain_states.insert("a.test".to_string(), state);

        coordinator.on_cron(IDLE_EVICTION_MS + 1);
        assert!(coordinator.domain_states.contains_key("a.test"));
    }

    #[test]
    fn records_stalled_warning_without_changing_status() {
        let mut coordinator = Coordinator::new("r1".to_string(), 0);
        coordinator.start(0).unwrap();
        coordinator.on_cron(STALL_THRESHOLD_MS + 1);
        let snapshot = coordinator.to_snapshot();
        let run_state = snapshot.run_state.unwrap();
        assert!(run_state.error.is_some());
        assert_eq!(run_state.status, crate::run::RunStatus::Running);
    }
}
