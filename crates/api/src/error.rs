//! Maps engine/storage/workflow errors onto HTTP responses (§7).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nebula_engine::EngineError;
use nebula_storage::StoreError;
use nebula_workflow::WorkflowError;
use serde_json::json;
use thiserror::Error;

/// The control plane's unified error type. Every handler returns
/// `Result<_, ApiError>`; this type's [`IntoResponse`] impl is the single
/// place status codes get decided.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body or query (maps to 422).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request named exactly zero or more than one resolution target,
    /// or otherwise could not be resolved (maps to 400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No such workflow, version, or execution (maps to 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// A debug-control request was issued against an execution that is not
    /// `paused` (maps to 409, §7).
    #[error("execution is not paused")]
    Conflict,

    /// Every other engine/store failure (maps to 500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict => (StatusCode::CONFLICT, self.to_string()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::WorkflowNotFound(_)
            | StoreError::WorkflowVersionNotFound(_)
            | StoreError::ExecutionNotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ValidationError(msg) => Self::Validation(msg),
            EngineError::GraphInvalid(_)
            | EngineError::InvokeTargetMissing
            | EngineError::NoResumeCursor => Self::BadRequest(err.to_string()),
            EngineError::Store(store_err) => store_err.into(),
            EngineError::Workflow(workflow_err) => workflow_err.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}
