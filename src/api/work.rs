//! Worker- and maintenance-facing handlers: `POST /request-work`,
//! `POST /report-result`, `POST /on-cron` (spec §6). Unlike the operator
//! paths these keep their literal top-level routes and carry `runId` in
//! the JSON body, matching spec §6's payload shapes exactly.

use super::error::RequestError;
use super::AppState;
use crate::coordinator::{ResultReport, WorkerConfig};
use crate::frontier::normalize_url;
use base64::Engine;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWorkBody {
    pub run_id: String,
    pub batch_size: Option<u32>,
    #[allow(dead_code)]
    pub worker_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub url: String,
    pub depth: u32,
    pub priority: i64,
    pub retry_count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWorkResponseBody {
    pub urls: Vec<WorkItem>,
    pub queue_size: usize,
    pub config: WorkerConfig,
}

/// An unrecognized `runId` is not an error (spec §6 describes no such
/// validation, and a fresh run simply has no work) — the registry
/// lazily spawns a `pending` run that immediately returns an empty batch,
/// same as any other run that hasn't been started yet.
pub async fn request_work(
    State(state): State<AppState>,
    Json(body): Json<RequestWorkBody>,
) -> Result<Json<RequestWorkResponseBody>, RequestError> {
    let handle = state.registry.handle_for(&body.run_id).await?;
    let result = handle.request_work(body.batch_size).await?;

    Ok(Json(RequestWorkResponseBody {
        urls: result
            .urls
            .into_iter()
            .map(|item| WorkItem {
                url: item.url.to_string(),
                depth: item.depth,
                priority: item.priority,
                retry_count: item.retry_count,
            })
            .collect(),
        queue_size: result.queue_size,
        config: result.config,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResultBody {
    pub run_id: String,
    pub url: String,
    /// The depth the dispatched work item carried (spec §9's corrected
    /// depth-propagation fix: a worker echoes what it was handed).
    pub depth: u32,
    pub status: Option<u16>,
    pub content_hash: Option<String>,
    pub content_size: Option<u64>,
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub discovered_urls: Vec<String>,
    pub error: Option<String>,
    #[allow(dead_code)]
    pub fetched_at: Option<i64>,
    /// Base64-encoded page body. Optional, and only present when
    /// `storeContent` is set in the worker configuration projection; when
    /// given it is written to the blob store *before* the coordinator
    /// report is applied (spec §5: "if the blob write fails, the report
    /// must not be applied").
    pub content: Option<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "text/html".to_string()
}

#[derive(Debug, Serialize)]
pub struct ReportResultResponseBody {
    pub success: bool,
}

pub async fn report_result(
    State(state): State<AppState>,
    Json(body): Json<ReportResultBody>,
) -> Result<Json<ReportResultResponseBody>, RequestError> {
    let domain = normalize_url(&body.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| body.url.clone());

    let mut content_hash = body.content_hash.clone();

    if let Some(encoded) = &body.content {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|err| RequestError::InvalidRequest(format!("invalid base64 content: {err}")))?;

        let hash = content_hash.clone().unwrap_or_else(|| {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            hex::encode(hasher.finalize())
        });

        let key = crate::collaborators::blob_key(&body.run_id, &domain, &hash);
        state
            .blob
            .put(&key, &bytes, &body.content_type, &Default::default())
            .map_err(|err| crate::CoordinatorError::Internal(err.to_string()))?;

        content_hash = Some(hash);
    }

    let report = ResultReport {
        url: body.url.clone(),
        depth: body.depth,
        status: body.status,
        error: body.error.clone(),
        content_hash: content_hash.clone(),
        content_size: body.content_size,
        response_time_ms: body.response_time_ms,
        discovered_urls: body.discovered_urls,
    };

    let handle = state.registry.handle_for(&body.run_id).await?;
    handle.report_result(report).await?;

    let record = crate::collaborators::PageRecord {
        run_id: body.run_id,
        url: body.url,
        domain,
        status: body.status,
        content_hash,
        content_size: body.content_size,
        response_time_ms: body.response_time_ms,
        fetched_at: body.fetched_at.unwrap_or(0),
        error: body.error,
    };
    if let Err(err) = state.metadata.upsert(&record) {
        tracing::warn!(error = %err, url = %record.url, "page-metadata upsert failed (best-effort)");
    }

    Ok(Json(ReportResultResponseBody { success: true }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnCronResponseBody {
    pub queue_size: usize,
}

/// `POST /on-cron` (spec §4.5d/§6): runs the maintenance tick across every
/// run this process has touched since startup, since the literal path
/// carries no run id.
pub async fn on_cron(
    State(state): State<AppState>,
) -> Result<Json<OnCronResponseBody>, RequestError> {
    let mut total_queue_size = 0;
    for run_id in state.registry.known_run_ids().await {
        let handle = state.registry.handle_for(&run_id).await?;
        let result = handle.on_cron().await?;
        total_queue_size += result.queue_size;
    }
    Ok(Json(OnCronResponseBody {
        queue_size: total_queue_size,
    }))
}
