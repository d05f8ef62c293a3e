//! Named configuration presets (spec §6: `GET /status`'s optional
//! `config:{id,name}` field, and the `CONFIG_NOT_FOUND`/`CONFIG_IN_USE`
//! error codes).
//!
//! `POST /configure {configId, name?, config}` resolves `configId` against
//! this registry as the merge base when given; the first caller to name a
//! fresh id registers it. A preset already bound to a running run cannot be
//! re-registered with different content (`CONFIG_IN_USE`) — this is the
//! only mutation this registry exposes beyond insertion.

use crate::config::types::RunConfig;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Hex-encoded SHA-256 over the canonical JSON of a merged `RunConfig`,
/// minted as the `configId` returned by `POST /configure` (spec §6). Same
/// hash-of-content approach as [`crate::config::compute_config_hash`], just
/// over the in-memory config instead of a file.
pub fn compute_run_config_hash(config: &RunConfig) -> String {
    let json = serde_json::to_vec(config).expect("RunConfig always serializes");
    let mut hasher = Sha256::new();
    hasher.update(&json);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigPreset {
    pub name: String,
    pub config: RunConfig,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigRegistry {
    presets: HashMap<String, ConfigPreset>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&ConfigPreset> {
        self.presets.get(id)
    }

    /// Registers a preset under `id`. Returns `Err(())` if `id` already
    /// names a preset with different content and `in_use` is `true` (the
    /// preset is bound to a currently running run).
    pub fn register(
        &mut self,
        id: String,
        name: String,
        config: RunConfig,
        in_use: bool,
    ) -> Result<(), ()> {
        if let Some(existing) = self.presets.get(&id) {
            if in_use && (existing.name != name || existing.config != config) {
                return Err(());
            }
        }
        self.presets.insert(id, ConfigPreset { name, config });
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.presets.contains_key(id)
    }
}
