//! The [`Execution`] record: identity, status, and the cursor/context
//! fields the resume controller reads.

use chrono::{DateTime, Utc};
use nebula_core::{ExecutionId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::status::ExecutionStatus;

/// One run of a [`WorkflowVersion`](nebula_workflow::WorkflowVersion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    /// Opaque identity.
    pub id: ExecutionId,
    /// The version being interpreted.
    pub workflow_version_id: WorkflowId,
    /// Current lifecycle state.
    pub status: ExecutionStatus,
    /// When the run loop first started stepping.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal state, if it has.
    pub finished_at: Option<DateTime<Utc>>,
    /// The node the loop is at or paused before.
    pub current_node_id: Option<String>,
    /// Whether this run was created with single-step debugging enabled.
    pub debug_mode: bool,
    /// The context as of the last pause or terminal transition; `None`
    /// means "do not overwrite" when passed to a status update.
    pub final_context_json: Option<Value>,
    /// The execution that invoked this one via `invoke_workflow`, if any.
    pub parent_execution_id: Option<ExecutionId>,
    /// Caller-supplied trigger classification (e.g. `"manual"`, `"webhook"`).
    pub trigger_type: Option<String>,
    /// Caller-supplied trigger payload, opaque to the engine.
    pub trigger_payload: Option<Value>,
    /// Caller-supplied dedupe key; unique across all executions when present.
    pub idempotency_key: Option<String>,
    /// Caller-supplied or inherited correlation id, threaded through child
    /// invocations.
    pub correlation_id: Option<String>,
}

impl Execution {
    /// Builds a fresh, not-yet-started execution row for `workflow_version_id`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ExecutionId,
        workflow_version_id: WorkflowId,
        started_at: DateTime<Utc>,
        debug_mode: bool,
        parent_execution_id: Option<ExecutionId>,
        trigger_type: Option<String>,
        trigger_payload: Option<Value>,
        idempotency_key: Option<String>,
        correlation_id: Option<String>,
    ) -> Self {
        Self {
            id,
            workflow_version_id,
            status: ExecutionStatus::Running,
            started_at,
            finished_at: None,
            current_node_id: None,
            debug_mode,
            final_context_json: None,
            parent_execution_id,
            trigger_type,
            trigger_payload,
            idempotency_key,
            correlation_id,
        }
    }
}
