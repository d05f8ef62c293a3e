//! `GET /runs/:run_id/content/*key` — a thin read-through over the blob
//! store (spec §6's `CONTENT_NOT_FOUND` error code implies a retrieval
//! path for stored page content; the key shape is exactly
//! [`crate::collaborators::blob_key`]'s).

use super::error::RequestError;
use super::AppState;
use crate::CoordinatorError;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ContentPath {
    run_id: String,
    key: String,
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(ContentPath { run_id, key }): Path<ContentPath>,
) -> Result<Response, RequestError> {
    let full_key = format!("{run_id}/{key}");
    let bytes = state
        .blob
        .get(&full_key)
        .map_err(|err| CoordinatorError::Internal(err.to_string()))?
        .ok_or_else(|| CoordinatorError::ContentNotFound(full_key.clone()))?;

    Ok(([(header::CONTENT_TYPE, "text/html")], bytes).into_response())
}
