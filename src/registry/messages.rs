//! The actor mailbox's message type. One variant per coordinator operation
//! that must run to completion inside the run's single-writer exclusion
//! (spec §5).

use crate::config::RunConfig;
use crate::coordinator::{
    MaintenanceResult, RequestWorkResult, ResultReport, SeedOutcome, StatsSnapshot,
    StatusSnapshot,
};
use crate::Result;
use tokio::sync::oneshot;

/// A `POST /seed` request (spec §6), already split into a priority- and
/// depth-uniform batch — the HTTP layer is responsible for defaulting
/// `depth`/`priority` before constructing this.
#[derive(Debug, Clone)]
pub struct SeedRequest {
    pub urls: Vec<String>,
    pub depth: u32,
    pub priority: i64,
}

pub enum CoordinatorMessage {
    Seed {
        request: SeedRequest,
        reply: oneshot::Sender<Result<SeedOutcome>>,
    },
    Configure {
        /// When set, the patch is merged onto this config instead of the
        /// run's current one (an operator configuring from a named preset
        /// via `configId` rather than the run's in-flight configuration).
        base: Option<RunConfig>,
        patch: serde_json::Value,
        reply: oneshot::Sender<Result<RunConfig>>,
    },
    Start {
        reply: oneshot::Sender<Result<()>>,
    },
    Pause {
        reply: oneshot::Sender<Result<()>>,
    },
    Resume {
        reply: oneshot::Sender<Result<()>>,
    },
    Cancel {
        reply: oneshot::Sender<Result<()>>,
    },
    Reset {
        reply: oneshot::Sender<Result<()>>,
    },
    RequestWork {
        batch_size: Option<u32>,
        reply: oneshot::Sender<Result<RequestWorkResult>>,
    },
    ReportResult {
        report: ResultReport,
        reply: oneshot::Sender<Result<()>>,
    },
    Stats {
        reply: oneshot::Sender<StatsSnapshot>,
    },
    Status {
        reply: oneshot::Sender<StatusSnapshot>,
    },
    OnCron {
        reply: oneshot::Sender<Result<MaintenanceResult>>,
    },
}
