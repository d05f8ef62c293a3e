//! Operator-facing handlers, nested under `/runs/:run_id/...` (spec §6):
//! seeding, configuration, lifecycle transitions, and the two read
//! projections.

use super::error::RequestError;
use super::AppState;
use crate::coordinator::{DomainBreakdownEntry, SeedOutcome};
use crate::registry::SeedRequest;
use crate::run::{RecentError, RunStatus};
use crate::CoordinatorError;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

async fn handle_for(state: &AppState, run_id: &str) -> crate::Result<crate::registry::RunHandle> {
    state.registry.handle_for(run_id).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequestBody {
    pub urls: Vec<String>,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub priority: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedUrl {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponseBody {
    pub admitted: u32,
    pub rejected: u32,
    pub queue_size: usize,
    pub rejections: Vec<RejectedUrl>,
}

impl From<SeedOutcome> for SeedResponseBody {
    fn from(outcome: SeedOutcome) -> Self {
        Self {
            admitted: outcome.admitted,
            rejected: outcome.rejected,
            queue_size: outcome.queue_size,
            rejections: outcome
                .rejections
                .into_iter()
                .map(|(url, reason)| RejectedUrl {
                    url,
                    reason: reason.as_str().to_string(),
                })
                .collect(),
        }
    }
}

pub async fn seed(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    Json(body): Json<SeedRequestBody>,
) -> Result<Json<SeedResponseBody>, RequestError> {
    if body.urls.is_empty() {
        return Err(RequestError::InvalidRequest(
            "urls must be a non-empty array".to_string(),
        ));
    }

    let handle = handle_for(&state, &run_id).await?;
    let outcome = handle
        .seed(SeedRequest {
            urls: body.urls,
            depth: body.depth,
            priority: body.priority,
        })
        .await?;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureRequestBody {
    pub config_id: Option<String>,
    pub name: Option<String>,
    #[serde(default = "empty_config_patch")]
    pub config: serde_json::Value,
}

fn empty_config_patch() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureResponseBody {
    pub config_id: String,
}

/// `POST /configure` (spec §6): merges `config` (a partial per-section
/// patch, spec §9) onto either the run's current configuration or, when
/// `configId` names a previously-registered preset, that preset instead.
/// Mints and registers the resulting config under its content hash
/// (`CONFIG_IN_USE` if that hash is already bound, with different content,
/// to a currently-running run).
pub async fn configure(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    Json(body): Json<ConfigureRequestBody>,
) -> Result<Json<ConfigureResponseBody>, RequestError> {
    let handle = handle_for(&state, &run_id).await?;

    let base = match &body.config_id {
        Some(config_id) => {
            let presets = state.registry.config_registry().lock().await;
            let preset = presets
                .get(config_id)
                .ok_or_else(|| CoordinatorError::ConfigNotFound(config_id.clone()))?;
            Some(preset.config.clone())
        }
        None => None,
    };

    let merged = handle.configure(base, body.config).await?;
    let config_id = crate::config::compute_run_config_hash(&merged);

    let running = handle.status().await.status == RunStatus::Running;
    let name = body.name.unwrap_or_else(|| config_id.clone());
    {
        let mut presets = state.registry.config_registry().lock().await;
        presets
            .register(config_id.clone(), name, merged, running)
            .map_err(|()| CoordinatorError::ConfigInUse(config_id.clone()))?;
    }

    Ok(Json(ConfigureResponseBody { config_id }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleResponseBody {
    pub status: RunStatus,
}

macro_rules! lifecycle_handler {
    ($name:ident, $call:ident) => {
        pub async fn $name(
            State(state): State<AppState>,
            Path(run_id): Path<String>,
        ) -> Result<Json<LifecycleResponseBody>, RequestError> {
            let handle = handle_for(&state, &run_id).await?;
            handle.$call().await?;
            let status = handle.status().await.status;
            Ok(Json(LifecycleResponseBody { status }))
        }
    };
}

lifecycle_handler!(start, start);
lifecycle_handler!(pause, pause);
lifecycle_handler!(resume, resume);
lifecycle_handler!(cancel, cancel);

/// `reset` is orthogonal to the other transitions (spec §4.4) and its
/// actor call cannot fail, unlike the others.
pub async fn reset(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<LifecycleResponseBody>, RequestError> {
    let handle = handle_for(&state, &run_id).await?;
    handle.reset().await?;
    let status = handle.status().await.status;
    Ok(Json(LifecycleResponseBody { status }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub id: String,
    pub status: RunStatus,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponseBody {
    pub run: RunSummary,
    pub stats: crate::run::Stats,
    pub progress: crate::run::Progress,
    pub domain_breakdown: Vec<DomainBreakdownEntry>,
    pub recent_errors: Vec<RecentError>,
}

/// `GET /stats` (spec §6).
pub async fn stats(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<StatsResponseBody>, RequestError> {
    let handle = handle_for(&state, &run_id).await?;
    let snapshot = handle.stats().await;
    Ok(Json(StatsResponseBody {
        run: RunSummary {
            id: snapshot.run_id,
            status: snapshot.status,
            started_at: snapshot.started_at,
            completed_at: snapshot.completed_at,
        },
        stats: snapshot.stats,
        progress: snapshot.progress,
        domain_breakdown: snapshot.domain_breakdown,
        recent_errors: snapshot.recent_errors,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponseBody {
    pub status: RunStatus,
    pub queue_size: usize,
    pub visited_count: usize,
    pub domains_tracked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigRef>,
}

/// `GET /status` (spec §6). `config` is populated from the run's last
/// `configure` call, resolving the preset's name from the config registry
/// when one was registered alongside it.
pub async fn status(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<StatusResponseBody>, RequestError> {
    let handle = handle_for(&state, &run_id).await?;
    let snapshot = handle.status().await;

    let config = match &snapshot.config_id {
        Some(id) => {
            let presets = state.registry.config_registry().lock().await;
            let name = presets
                .get(id)
                .map(|preset| preset.name.clone())
                .unwrap_or_else(|| id.clone());
            Some(ConfigRef { id: id.clone(), name })
        }
        None => None,
    };

    Ok(Json(StatusResponseBody {
        status: snapshot.status,
        queue_size: snapshot.queue_size,
        visited_count: snapshot.visited_count,
        domains_tracked: snapshot.domains_tracked,
        config,
    }))
}
