//! Persistence & Dispatch API (C5): the durability contract of spec §4.5 —
//! one atomic snapshot-put of five named slots at the tail of every public
//! mutation, and idempotent hydration on first touch of a run.

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::domain::DomainState;
use crate::frontier::QueuedUrl;
use crate::run::{RecentError, RunState};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned: {0}")]
    Lock(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// The five named slots of spec §4.5, persisted together as one unit.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub pending_queue: Vec<QueuedUrl>,
    pub visited_urls: Vec<u32>,
    pub domain_states: HashMap<String, DomainState>,
    pub run_state: Option<RunState>,
    pub recent_errors: VecDeque<RecentError>,
}

/// Durable storage for run snapshots. Implementations must make
/// `save_snapshot` atomic: either the whole snapshot lands, or none of it
/// does.
pub trait Storage: Send + Sync {
    /// Loads a run's snapshot. Returns `Ok(None)` for a run never
    /// persisted before (hydration must treat this as an empty run, not an
    /// error).
    fn load_snapshot(&self, run_id: &str) -> StorageResult<Option<Snapshot>>;

    fn save_snapshot(&self, run_id: &str, snapshot: &Snapshot) -> StorageResult<()>;

    fn list_run_ids(&self) -> StorageResult<Vec<String>>;
}
