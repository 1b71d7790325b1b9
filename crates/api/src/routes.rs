//! The HTTP control plane's route table (§6), implemented verbatim against
//! the representative endpoint list.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use tower_http::trace::TraceLayer;
use nebula_core::{ExecutionId, WorkflowId};
use nebula_engine::{run_loop, resume, EngineError, ResumeAction, RunLoopInput};
use nebula_execution::Execution;
use nebula_workflow::{Workflow, WorkflowVersion};

use crate::dto::{
    is_paused, EventsResponse, ExecutionCreate, ExecutionResponse, ExecutionStateResponse,
    HealthResponse, WorkflowCreate, WorkflowResponse, WorkflowVersionCreate, WorkflowVersionResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

/// Builds the full `axum` router over `state`.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/workflows", post(create_workflow))
        .route("/workflows/{id}", get(get_workflow))
        .route("/workflows/{id}/versions", post(create_workflow_version))
        .route("/executions", post(create_execution))
        .route("/executions/{id}", get(get_execution))
        .route("/executions/{id}/events", get(list_events))
        .route("/executions/{id}/state", get(get_state))
        .route("/executions/{id}/debug/{action}", post(debug_control))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

async fn create_workflow(
    State(state): State<AppState>,
    Json(body): Json<WorkflowCreate>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let workflow = Workflow {
        id: WorkflowId::v4(),
        name: body.name,
        description: body.description,
        created_by: body.created_by,
        created_at: Utc::now(),
    };
    let created = state.store.create_workflow(workflow).await?;
    Ok(Json(created))
}

async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<WorkflowId>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    Ok(Json(state.store.get_workflow(id).await?))
}

async fn create_workflow_version(
    State(state): State<AppState>,
    Path(workflow_id): Path<WorkflowId>,
    Json(body): Json<WorkflowVersionCreate>,
) -> Result<Json<WorkflowVersionResponse>, ApiError> {
    // Validates the workflow exists before accepting a version for it.
    state.store.get_workflow(workflow_id).await?;

    let version_number = match state.store.get_latest_workflow_version(workflow_id).await {
        Ok(latest) => latest.version_number + 1,
        Err(nebula_storage::StoreError::WorkflowVersionNotFound(_)) => 1,
        Err(err) => return Err(err.into()),
    };

    let version = WorkflowVersion {
        id: WorkflowId::v4(),
        workflow_id,
        version_number,
        graph_json: body.graph_json,
        version_note: body.version_note,
        version_tag: body.version_tag,
        is_published: body.is_published,
        created_by: body.created_by,
        created_at: Utc::now(),
    };
    let created = state.store.create_workflow_version(version).await?;
    Ok(Json(created))
}

/// Resolves `body`'s target into a concrete version, per §4.9's resolution
/// order generalized to the control-plane's own `workflow_version_id`/
/// `workflow_id` choice (§6).
async fn resolve_target_version(
    state: &AppState,
    body: &ExecutionCreate,
) -> Result<WorkflowVersion, ApiError> {
    match (body.workflow_version_id, body.workflow_id) {
        (Some(version_id), None) => Ok(state.store.get_workflow_version(version_id).await?),
        (None, Some(workflow_id)) => {
            if body.published_only {
                Ok(state.store.get_latest_published_workflow_version(workflow_id).await?)
            } else {
                Ok(state.store.get_latest_workflow_version(workflow_id).await?)
            }
        }
        (Some(_), Some(_)) => Err(ApiError::Validation(
            "exactly one of workflow_version_id or workflow_id must be set".to_string(),
        )),
        (None, None) => Err(ApiError::Validation(
            "exactly one of workflow_version_id or workflow_id must be set".to_string(),
        )),
    }
}

async fn create_execution(
    State(state): State<AppState>,
    Json(body): Json<ExecutionCreate>,
) -> Result<Json<ExecutionResponse>, ApiError> {
    // §3 invariant: re-creating with a known idempotency key returns the
    // existing row unchanged, no new event log, no new context.
    if let Some(key) = &body.idempotency_key {
        if let Some(existing) = state.store.get_execution_by_idempotency_key(key).await? {
            return Ok(Json(existing));
        }
    }

    let version = resolve_target_version(&state, &body).await?;

    let execution = Execution::new(
        ExecutionId::v4(),
        version.id,
        Utc::now(),
        body.debug_mode,
        body.parent_execution_id,
        body.trigger_type.clone(),
        body.trigger_payload.clone(),
        body.idempotency_key.clone(),
        body.correlation_id.clone(),
    );
    let execution = state.store.create_execution(execution).await?;

    let deps = state.engine_deps();
    let input = RunLoopInput {
        execution_id: execution.id,
        workflow_version: Arc::new(version),
        input_json: body.input_json,
        call_depth: 0,
        parent_execution_id: body.parent_execution_id,
        correlation_id: body.correlation_id,
        start_node_id: None,
        context_override: None,
        is_resume: false,
    };

    let finished = run_loop::run(input, &deps).await?;
    Ok(Json(finished))
}

async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<ExecutionId>,
) -> Result<Json<ExecutionResponse>, ApiError> {
    Ok(Json(state.store.get_execution(id).await?))
}

async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<ExecutionId>,
) -> Result<Json<EventsResponse>, ApiError> {
    Ok(Json(state.store.list_events(id).await?))
}

async fn get_state(
    State(state): State<AppState>,
    Path(id): Path<ExecutionId>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ExecutionStateResponse>, ApiError> {
    // Validates the execution exists (404 on an unknown id, per the table).
    state.store.get_execution(id).await?;

    let event_index: u64 = query
        .get("event_index")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ApiError::Validation("event_index query parameter is required".to_string()))?;

    let snapshot = state.store.get_latest_snapshot_before(id, event_index).await?;
    Ok(Json(ExecutionStateResponse {
        event_index,
        snapshot_event_index: snapshot.as_ref().map(|s| s.event_index),
        context: snapshot.map(|s| s.context_json),
    }))
}

async fn debug_control(
    State(state): State<AppState>,
    Path((id, action)): Path<(ExecutionId, String)>,
) -> Result<Json<ExecutionResponse>, ApiError> {
    let action = ResumeAction::parse(&action)
        .ok_or_else(|| ApiError::Validation(format!("unknown debug action `{action}`")))?;

    // Pre-check so the abort/non-paused distinction maps to exactly the
    // 409 §7 describes, rather than the engine's `NoResumeCursor`.
    if action != ResumeAction::Abort {
        let execution = state.store.get_execution(id).await?;
        if !is_paused(execution.status) {
            return Err(ApiError::Conflict);
        }
    }

    let deps = state.engine_deps();
    match resume::handle(id, action, &deps).await {
        Ok(execution) => Ok(Json(execution)),
        Err(EngineError::NoResumeCursor) => Err(ApiError::Conflict),
        Err(other) => Err(other.into()),
    }
}
