//! Request/response bodies for the HTTP control plane (§6).

use nebula_core::{ExecutionId, WorkflowId};
use nebula_execution::{Execution, ExecutionEvent, ExecutionStatus};
use nebula_workflow::{Workflow, WorkflowVersion};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `POST /workflows` body.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowCreate {
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Who is creating this workflow, if known.
    pub created_by: Option<String>,
}

/// `POST /workflows/{id}/versions` body.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowVersionCreate {
    /// The authored or legacy-shaped graph JSON (§4.2).
    pub graph_json: Value,
    /// Optional free-text note.
    pub version_note: Option<String>,
    /// Optional short tag.
    pub version_tag: Option<String>,
    /// Whether "latest published" lookups may select this version.
    #[serde(default = "default_true")]
    pub is_published: bool,
    /// Who is creating this version, if known.
    pub created_by: Option<String>,
}

fn default_true() -> bool {
    true
}

/// `POST /executions` body. Exactly one of `workflow_version_id` or
/// `workflow_id` must be set (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionCreate {
    /// Run this specific, already-resolved version.
    pub workflow_version_id: Option<WorkflowId>,
    /// Resolve the latest (or latest published) version of this workflow.
    pub workflow_id: Option<WorkflowId>,
    /// When resolving by `workflow_id`, restrict to published versions.
    #[serde(default = "default_true")]
    pub published_only: bool,
    /// The run's trigger payload, bound to `vars`/`vars.input` at start.
    #[serde(default)]
    pub input_json: Map<String, Value>,
    /// Whether this run was created with single-step debugging enabled.
    #[serde(default)]
    pub debug_mode: bool,
    /// Caller-supplied trigger classification.
    pub trigger_type: Option<String>,
    /// Caller-supplied trigger payload, opaque to the engine.
    pub trigger_payload: Option<Value>,
    /// Caller-supplied dedupe key; re-using one returns the original
    /// execution unchanged (§3 invariant).
    pub idempotency_key: Option<String>,
    /// Caller-supplied or inherited correlation id.
    pub correlation_id: Option<String>,
    /// Set when this run is itself a child of another execution.
    pub parent_execution_id: Option<ExecutionId>,
}

/// `GET /executions/{id}/state` response.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionStateResponse {
    /// The event index the caller asked to view.
    pub event_index: u64,
    /// The snapshot actually used to answer the query, if any existed
    /// at or before `event_index` (§4.1 `get_latest_snapshot_before`).
    pub snapshot_event_index: Option<u64>,
    /// The context captured at `snapshot_event_index`, if one was found.
    pub context: Option<Value>,
}

/// `GET /executions/{id}/events` response: events in index order.
pub type EventsResponse = Vec<ExecutionEvent>;

/// `GET /workflows/{id}` and `POST /workflows` response.
pub type WorkflowResponse = Workflow;

/// `POST /workflows/{id}/versions` response.
pub type WorkflowVersionResponse = WorkflowVersion;

/// `GET /executions/{id}` and `POST /executions` response (final state).
pub type ExecutionResponse = Execution;

/// `GET /health` response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process can answer at all.
    pub status: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok" }
    }
}

/// Narrows [`ExecutionStatus`] down to the subset meaningful as a debug
/// path segment check, kept here rather than in `nebula-execution` since
/// it is purely an HTTP-boundary concern (§7: "A 409 from a debug command
/// means the execution is not in `paused`").
#[must_use]
pub fn is_paused(status: ExecutionStatus) -> bool {
    status.is_paused()
}
