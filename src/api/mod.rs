//! The operator- and worker-facing HTTP surface (spec §6), built on axum —
//! the same `Router`/`State`/handler-function shape the search-engine
//! sibling in this codebase's lineage uses for its own API surface.
//!
//! CORS, bearer-token auth, and request/response envelope shaping beyond
//! the error envelope of §6/§7 are explicit Non-goals (spec §1): a
//! deployment fronts this router with whatever gateway enforces those.
//!
//! Routing decision (spec §9 open question: the literal path list in §6
//! carries no run id for the operator paths, yet §2 scopes all state to
//! "the run"): operator paths are nested under `/runs/:run_id/...` so one
//! process can serve the several runs [`crate::registry::RunRegistry`]
//! already supports, while the worker-facing `/request-work` and
//! `/report-result` keep the literal top-level paths and take `runId` from
//! their JSON body exactly as spec'd, since a worker is not expected to
//! know which path prefix a given run lives under ahead of time.

mod content;
mod error;
mod runs;
mod work;

use crate::collaborators::{BlobStore, PageMetadataStore};
use crate::registry::RunRegistry;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub registry: RunRegistry,
    pub blob: Arc<dyn BlobStore>,
    pub metadata: Arc<dyn PageMetadataStore>,
}

/// Builds the full coordinator `Router` (spec §6). `request_timeout`
/// bounds how long a single request may run before axum aborts it with a
/// 408 — set generously above `requestTimeoutMs` in the worker config
/// projection, since that timeout governs the *fetch*, not this API call.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/runs/:run_id/seed", post(runs::seed))
        .route("/runs/:run_id/configure", post(runs::configure))
        .route("/runs/:run_id/start", post(runs::start))
        .route("/runs/:run_id/pause", post(runs::pause))
        .route("/runs/:run_id/resume", post(runs::resume))
        .route("/runs/:run_id/cancel", post(runs::cancel))
        .route("/runs/:run_id/reset", post(runs::reset))
        .route("/runs/:run_id/stats", get(runs::stats))
        .route("/runs/:run_id/status", get(runs::status))
        .route("/runs/:run_id/content/*key", get(content::get_content))
        .route("/request-work", post(work::request_work))
        .route("/report-result", post(work::report_result))
        .route("/on-cron", post(work::on_cron))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FsBlobStore, SqlitePageMetadataStore};
    use crate::persistence::SqliteStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let storage = Arc::new(SqliteStore::open_in_memory().unwrap());
        let registry = RunRegistry::new(storage);
        let dir = tempfile::tempdir().unwrap();
        let blob = Arc::new(FsBlobStore::new(dir.path()));
        let metadata = Arc::new(SqlitePageMetadataStore::open_in_memory().unwrap());
        router(
            AppState { registry, blob, metadata },
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn seed_then_status_reflects_queue_size() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/runs/r1/seed")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"urls":["https://a.test/p1"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/runs/r1/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["queueSize"], 1);
    }

    #[tokio::test]
    async fn unknown_run_request_work_returns_empty_batch_not_an_error() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/request-work")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"runId":"ghost"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["urls"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn pause_before_start_returns_run_not_running_error() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/runs/r1/pause")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "RUN_NOT_RUNNING");
    }
}
