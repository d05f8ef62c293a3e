//! Run State Machine (C4): the lifecycle transitions of spec §4.4.

use crate::config::RunConfig;
use crate::run::errors_ring::RecentErrorsRing;
use crate::run::stats::{Progress, Stats};
use crate::CoordinatorError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// A run's lifecycle record (spec §3's "Run State"), minus the Frontier,
/// Visited Index, and Domain States it is persisted alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub id: String,
    pub status: RunStatus,
    pub config: RunConfig,
    pub config_id: Option<String>,
    pub stats: Stats,
    pub progress: Progress,
    pub started_at: Option<i64>,
    pub paused_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub error: Option<String>,
    /// Not named explicitly in the Run State record, but required by the
    /// maintenance tick's stalled-run check (spec §4.5c); updated on every
    /// handler that touches this run.
    pub last_activity_at: i64,
    #[serde(skip)]
    pub recent_errors: RecentErrorsRing,
}

impl RunState {
    pub fn new(id: String, now_ms: i64) -> Self {
        Self {
            id,
            status: RunStatus::Pending,
            config: RunConfig::default(),
            config_id: None,
            stats: Stats::default(),
            progress: Progress::default(),
            started_at: None,
            paused_at: None,
            completed_at: None,
            error: None,
            last_activity_at: now_ms,
            recent_errors: RecentErrorsRing::new(),
        }
    }

    /// `start` is valid from `pending` or idempotently from `running`;
    /// rejected with `RUN_COMPLETED` from any terminal state.
    pub fn start(&mut self, now_ms: i64) -> Result<(), CoordinatorError> {
        match self.status {
            RunStatus::Pending => {
                self.status = RunStatus::Running;
                self.started_at = Some(now_ms);
            }
            RunStatus::Running => {}
            RunStatus::Paused => return Err(CoordinatorError::InvalidRunState),
            RunStatus::Completed | RunStatus::Cancelled | RunStatus::Failed => {
                return Err(CoordinatorError::RunCompleted)
            }
        }
        self.touch(now_ms);
        Ok(())
    }

    pub fn pause(&mut self, now_ms: i64) -> Result<(), CoordinatorError> {
        if self.status != RunStatus::Running {
            return Err(CoordinatorError::RunNotRunning);
        }
        self.status = RunStatus::Paused;
        self.paused_at = Some(now_ms);
        self.touch(now_ms);
        Ok(())
    }

    pub fn resume(&mut self, now_ms: i64) -> Result<(), CoordinatorError> {
        if self.status != RunStatus::Paused {
            return Err(CoordinatorError::InvalidRunState);
        }
        self.status = RunStatus::Running;
        self.paused_at = None;
        self.touch(now_ms);
        Ok(())
    }

    /// `cancel` is valid except from a terminal state.
    pub fn cancel(&mut self, now_ms: i64) -> Result<(), CoordinatorError> {
        if self.status.is_terminal() {
            return Err(CoordinatorError::InvalidRunState);
        }
        self.status = RunStatus::Cancelled;
        self.completed_at = Some(now_ms);
        self.touch(now_ms);
        Ok(())
    }

    /// Auto-transition on an empty Frontier with an empty dispatch batch
    /// (spec §4.4's `auto` edge), or when `maxPagesPerRun` is reached.
    pub fn complete(&mut self, now_ms: i64) {
        if !self.status.is_terminal() {
            self.status = RunStatus::Completed;
            self.completed_at = Some(now_ms);
        }
        self.touch(now_ms);
    }

    /// Orthogonal to the other transitions: returns to `pending` from any
    /// state, clearing lifecycle timestamps and any stalled-warning error.
    /// The caller is responsible for clearing the Frontier, Visited Index,
    /// Domain States, and Recent Errors Ring (spec §4.4).
    pub fn reset(&mut self, now_ms: i64) {
        self.status = RunStatus::Pending;
        self.stats = Stats::default();
        self.progress = Progress::default();
        self.started_at = None;
        self.paused_at = None;
        self.completed_at = None;
        self.error = None;
        self.recent_errors.clear();
        self.touch(now_ms);
    }

    pub fn touch(&mut self, now_ms: i64) {
        self.last_activity_at = now_ms;
    }

    /// Maintenance-tick stalled check (spec §4.5c): records a
    /// stalled-warning on `error` without changing `status`.
    pub fn check_stalled(&mut self, now_ms: i64, stall_threshold_ms: i64) {
        if self.status == RunStatus::Running && now_ms - self.last_activity_at > stall_threshold_ms
        {
            self.error = Some(format!(
                "run has had no activity since {}",
                self.last_activity_at
            ));
        }
    }
}
