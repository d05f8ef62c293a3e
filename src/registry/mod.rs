//! Run registry: one single-writer actor task per run id (spec §5, §9 —
//! "an actor... receiving on a channel"). `RunRegistry` owns the map from
//! run id to that actor's mailbox and lazily spawns one on first touch of a
//! run, which is also where hydration from durable storage happens
//! (spec §4.5: "no operation proceeds before hydration completes").
//!
//! Across runs the registry may be used concurrently — each actor is an
//! independent `tokio::task` with no state shared between runs, matching
//! spec §5's cross-run concurrency guarantee.

mod actor;
mod messages;

pub use actor::RunHandle;
pub use messages::{CoordinatorMessage, SeedRequest};

use crate::config::ConfigRegistry;
use crate::persistence::Storage;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared, process-wide registry of run actors. Cheaply cloneable (an
/// `Arc` inside), so the HTTP layer can hand a copy to every request.
#[derive(Clone)]
pub struct RunRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn Storage>,
    configs: Mutex<ConfigRegistry>,
    runs: Mutex<HashMap<String, RunHandle>>,
}

impl RunRegistry {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage,
                configs: Mutex::new(ConfigRegistry::new()),
                runs: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns the actor handle for `run_id`, spawning and hydrating one if
    /// this is the first touch of the run since process start.
    pub async fn handle_for(&self, run_id: &str) -> Result<RunHandle> {
        let mut runs = self.inner.runs.lock().await;
        if let Some(handle) = runs.get(run_id) {
            return Ok(handle.clone());
        }

        let snapshot = self.inner.storage.load_snapshot(run_id)?;
        let handle = actor::spawn(run_id.to_string(), snapshot, self.inner.storage.clone());
        runs.insert(run_id.to_string(), handle.clone());
        Ok(handle)
    }

    /// Every run id this process has touched since startup. Used by the
    /// maintenance ticker (spec §4.5d) to drive `on-cron` across all runs
    /// without requiring the caller to enumerate run ids itself.
    pub async fn known_run_ids(&self) -> Vec<String> {
        self.inner.runs.lock().await.keys().cloned().collect()
    }

    pub fn config_registry(&self) -> &Mutex<ConfigRegistry> {
        &self.inner.configs
    }
}
