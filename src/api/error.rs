//! Maps [`CoordinatorError`] onto the error envelope of spec §6/§7:
//! `{success:false, error:{code, message, details?}}` plus an HTTP status.
//! Handlers never construct this envelope by hand — they return
//! `crate::Result<T>` and `?`, and this `IntoResponse` impl does the rest.

use crate::{ConfigError, CoordinatorError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub struct ApiError(pub CoordinatorError);

impl From<CoordinatorError> for ApiError {
    fn from(err: CoordinatorError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

/// Request-level validation failures that never reach the coordinator
/// (spec §7 tier 1) — a malformed JSON body, a bad run id path segment —
/// alongside the `CoordinatorError` this module otherwise maps.
pub enum RequestError {
    Coordinator(CoordinatorError),
    InvalidRequest(String),
}

impl From<CoordinatorError> for RequestError {
    fn from(err: CoordinatorError) -> Self {
        Self::Coordinator(err)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        match self {
            RequestError::InvalidRequest(message) => {
                respond(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None)
            }
            RequestError::Coordinator(err) => ApiError(err).into_response(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = classify(&self.0);
        respond(status, code, self.0.to_string(), details)
    }
}

fn classify(err: &CoordinatorError) -> (StatusCode, &'static str, Option<serde_json::Value>) {
    match err {
        CoordinatorError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", None),
        CoordinatorError::RunNotFound(_) => (StatusCode::NOT_FOUND, "RUN_NOT_FOUND", None),
        CoordinatorError::ConfigNotFound(_) => {
            (StatusCode::NOT_FOUND, "CONFIG_NOT_FOUND", None)
        }
        CoordinatorError::ConfigInUse(_) => (StatusCode::CONFLICT, "CONFIG_IN_USE", None),
        CoordinatorError::RunAlreadyRunning => {
            (StatusCode::CONFLICT, "RUN_ALREADY_RUNNING", None)
        }
        CoordinatorError::RunNotRunning => (StatusCode::CONFLICT, "RUN_NOT_RUNNING", None),
        CoordinatorError::RunCompleted => (StatusCode::CONFLICT, "RUN_COMPLETED", None),
        CoordinatorError::InvalidRunState => {
            (StatusCode::CONFLICT, "INVALID_RUN_STATE", None)
        }
        CoordinatorError::QueueFull => (StatusCode::BAD_REQUEST, "QUEUE_FULL", None),
        CoordinatorError::ContentNotFound(_) => {
            (StatusCode::NOT_FOUND, "CONTENT_NOT_FOUND", None)
        }
        CoordinatorError::Url(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", None),
        CoordinatorError::Config(config_err) => (
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
            config_details(config_err),
        ),
        CoordinatorError::Storage(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
        }
        CoordinatorError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
        }
    }
}

fn config_details(err: &ConfigError) -> Option<serde_json::Value> {
    match err {
        ConfigError::InvalidPattern(pattern) => {
            Some(serde_json::json!({ "pattern": pattern }))
        }
        _ => None,
    }
}

fn respond(
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
) -> Response {
    let body = ErrorEnvelope {
        success: false,
        error: ErrorBody {
            code,
            message,
            details,
        },
    };
    (status, Json(body)).into_response()
}
