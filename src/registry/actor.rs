//! The per-run actor: a `tokio::task` that owns one [`Coordinator`]
//! exclusively, processing messages off an `mpsc` channel one at a time.
//! This is what gives a run single-writer semantics (spec §5) without an
//! explicit lock — the task itself is the mutual exclusion.
//!
//! Every handled message ends with exactly one [`Storage::save_snapshot`]
//! call before the reply is sent, satisfying the durability contract of
//! spec §4.5 ("if the operation returns success, its effect survives a
//! crash") without any suspension point between choosing a mutation and
//! persisting it (spec §5).

use super::messages::CoordinatorMessage;
use crate::coordinator::Coordinator;
use crate::persistence::{Snapshot, Storage};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;

const MAILBOX_CAPACITY: usize = 256;

/// A cheaply-cloneable handle to a run's actor mailbox.
#[derive(Clone)]
pub struct RunHandle {
    sender: mpsc::Sender<CoordinatorMessage>,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl RunHandle {
    pub async fn seed(
        &self,
        request: super::messages::SeedRequest,
    ) -> crate::Result<crate::coordinator::SeedOutcome> {
        self.call(|reply| CoordinatorMessage::Seed { request, reply }).await
    }

    pub async fn configure(
        &self,
        base: Option<crate::config::RunConfig>,
        patch: serde_json::Value,
    ) -> crate::Result<crate::config::RunConfig> {
        self.call(|reply| CoordinatorMessage::Configure { base, patch, reply }).await
    }

    pub async fn start(&self) -> crate::Result<()> {
        self.call(|reply| CoordinatorMessage::Start { reply }).await
    }

    pub async fn pause(&self) -> crate::Result<()> {
        self.call(|reply| CoordinatorMessage::Pause { reply }).await
    }

    pub async fn resume(&self) -> crate::Result<()> {
        self.call(|reply| CoordinatorMessage::Resume { reply }).await
    }

    pub async fn cancel(&self) -> crate::Result<()> {
        self.call(|reply| CoordinatorMessage::Cancel { reply }).await
    }

    pub async fn reset(&self) -> crate::Result<()> {
        self.call(|reply| CoordinatorMessage::Reset { reply }).await
    }

    pub async fn request_work(
        &self,
        batch_size: Option<u32>,
    ) -> crate::Result<crate::coordinator::RequestWorkResult> {
        self.call(|reply| CoordinatorMessage::RequestWork { batch_size, reply }).await
    }

    pub async fn report_result(&self, report: crate::coordinator::ResultReport) -> crate::Result<()> {
        self.call(|reply| CoordinatorMessage::ReportResult { report, reply }).await
    }

    pub async fn stats(&self) -> crate::coordinator::StatsSnapshot {
        self.call(|reply| CoordinatorMessage::Stats { reply }).await
    }

    pub async fn status(&self) -> crate::coordinator::StatusSnapshot {
        self.call(|reply| CoordinatorMessage::Status { reply }).await
    }

    pub async fn on_cron(&self) -> crate::Result<crate::coordinator::MaintenanceResult> {
        self.call(|reply| CoordinatorMessage::OnCron { reply }).await
    }

    /// Sends a message built from a fresh oneshot pair and awaits the
    /// reply. Panics only if the actor task itself has died, which can
    /// only happen if it panicked — a bug, not an expected runtime state.
    async fn call<T>(
        &self,
        build: impl FnOnce(tokio::sync::oneshot::Sender<T>) -> CoordinatorMessage,
    ) -> T {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .expect("run actor task has stopped unexpectedly");
        rx.await.expect("run actor dropped the reply channel")
    }
}

/// Spawns the actor task for `run_id`, hydrating it from `snapshot` (or an
/// empty run if this is the first ever touch) before it starts accepting
/// messages.
pub fn spawn(run_id: String, snapshot: Option<Snapshot>, storage: Arc<dyn Storage>) -> RunHandle {
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);

    let mut coordinator = match snapshot {
        Some(snapshot) => Coordinator::from_snapshot(run_id.clone(), snapshot, now_ms()),
        None => Coordinator::new(run_id.clone(), now_ms()),
    };

    tokio::spawn(async move {
        run_actor_loop(&mut coordinator, rx, storage.as_ref()).await;
    });

    RunHandle { sender: tx }
}

async fn run_actor_loop(
    coordinator: &mut Coordinator,
    mut inbox: mpsc::Receiver<CoordinatorMessage>,
    storage: &dyn Storage,
) {
    while let Some(message) = inbox.recv().await {
        match message {
            CoordinatorMessage::Seed { request, reply } => {
                let outcome = coordinator.seed(&request.urls, request.depth, request.priority, now_ms());
                tracing::debug!(
                    run_id = %coordinator.run_id,
                    admitted = outcome.admitted,
                    rejected = outcome.rejected,
                    queue_size = outcome.queue_size,
                    "seed"
                );
                let result = persist(coordinator, storage).map(|()| outcome).map_err(Into::into);
                let _ = reply.send(result);
            }
            CoordinatorMessage::Configure { base, patch, reply } => {
                let result = coordinator
                    .configure(base.as_ref(), &patch, now_ms())
                    .and_then(|()| persist(coordinator, storage).map_err(Into::into))
                    .map(|()| coordinator.config().clone());
                if result.is_ok() {
                    tracing::info!(run_id = %coordinator.run_id, "configuration updated");
                }
                let _ = reply.send(result);
            }
            CoordinatorMessage::Start { reply } => {
                let result = coordinator
                    .start(now_ms())
                    .and_then(|()| persist(coordinator, storage).map_err(Into::into));
                if result.is_ok() {
                    tracing::info!(run_id = %coordinator.run_id, "run started");
                }
                let _ = reply.send(result);
            }
            CoordinatorMessage::Pause { reply } => {
                let result = coordinator
                    .pause(now_ms())
                    .and_then(|()| persist(coordinator, storage).map_err(Into::into));
                if result.is_ok() {
                    tracing::info!(run_id = %coordinator.run_id, "run paused");
                }
                let _ = reply.send(result);
            }
            CoordinatorMessage::Resume { reply } => {
                let result = coordinator
                    .resume(now_ms())
                    .and_then(|()| persist(coordinator, storage).map_err(Into::into));
                if result.is_ok() {
                    tracing::info!(run_id = %coordinator.run_id, "run resumed");
                }
                let _ = reply.send(result);
            }
            CoordinatorMessage::Cancel { reply } => {
                let result = coordinator
                    .cancel(now_ms())
                    .and_then(|()| persist(coordinator, storage).map_err(Into::into));
                if result.is_ok() {
                    tracing::info!(run_id = %coordinator.run_id, "run cancelled");
                }
                let _ = reply.send(result);
            }
            CoordinatorMessage::Reset { reply } => {
                coordinator.reset(now_ms());
                tracing::info!(run_id = %coordinator.run_id, "run reset to pending");
                let result = persist(coordinator, storage).map_err(Into::into);
                let _ = reply.send(result);
            }
            CoordinatorMessage::RequestWork { batch_size, reply } => {
                let status_before = coordinator.status();
                let outcome = coordinator.request_work(batch_size, now_ms());
                tracing::trace!(
                    run_id = %coordinator.run_id,
                    dispatched = outcome.urls.len(),
                    queue_size = outcome.queue_size,
                    "request-work"
                );
                if status_before != crate::run::RunStatus::Completed
                    && coordinator.status() == crate::run::RunStatus::Completed
                {
                    tracing::info!(run_id = %coordinator.run_id, "run completed");
                }
                let result = persist(coordinator, storage).map(|()| outcome).map_err(Into::into);
                let _ = reply.send(result);
            }
            CoordinatorMessage::ReportResult { report, reply } => {
                tracing::debug!(
                    run_id = %coordinator.run_id,
                    url = %report.url,
                    status = report.status,
                    error = report.error.is_some(),
                    "report-result"
                );
                coordinator.report_result(report, now_ms());
                let result = persist(coordinator, storage).map_err(Into::into);
                let _ = reply.send(result);
            }
            CoordinatorMessage::Stats { reply } => {
                let _ = reply.send(coordinator.stats_snapshot());
            }
            CoordinatorMessage::Status { reply } => {
                let _ = reply.send(coordinator.status_snapshot());
            }
            CoordinatorMessage::OnCron { reply } => {
                let outcome = coordinator.on_cron(now_ms());
                let result = persist(coordinator, storage).map(|()| outcome).map_err(Into::into);
                let _ = reply.send(result);
            }
        }
    }
}

/// The one atomic snapshot-put at the tail of every mutating operation
/// (spec §4.5). A write failure is surfaced to the caller as
/// `CoordinatorError::Storage` (spec §7 tier 3: a coordinator fault must
/// not silently acknowledge success) rather than just logged.
fn persist(coordinator: &Coordinator, storage: &dyn Storage) -> crate::persistence::StorageResult<()> {
    let snapshot = coordinator.to_snapshot();
    let result = storage.save_snapshot(&coordinator.run_id, &snapshot);
    if let Err(err) = &result {
        tracing::error!(run_id = %coordinator.run_id, error = %err, "failed to persist run snapshot");
    }
    result
}
