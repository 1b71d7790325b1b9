//! The resume controller (§4.11): turns a debug-control request
//! (`resume`/`step`/`abort`) into either a terminal status update or a
//! re-entry into [`crate::run_loop::run`].

use std::sync::Arc;

use nebula_core::ExecutionId;
use nebula_execution::{Execution, EventType, ExecutionStatus};
use serde_json::{Map, Value, json};

use crate::EngineDeps;
use crate::error::EngineError;
use crate::run_loop::{self, RunLoopInput};

/// The three debug-control actions the control plane may request (§4.11, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAction {
    /// Re-enter the run loop at the stored cursor.
    Resume,
    /// Semantically identical to `Resume` at the engine level — single-step
    /// control belongs to the authoring client, which sets the next
    /// breakpoint before issuing the request (§4.11).
    Step,
    /// Terminate a paused execution without re-entering the loop.
    Abort,
}

impl ResumeAction {
    /// Parses the control-plane path segment (`resume`, `step`, `abort`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "resume" => Some(Self::Resume),
            "step" => Some(Self::Step),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }

    fn mode_str(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Step => "step",
            Self::Abort => "abort",
        }
    }
}

/// Re-enters or aborts a paused execution per `action`.
///
/// Returns `Err(EngineError::NoResumeCursor)` both when the execution
/// carries no usable cursor (§4.11) and when the caller requests
/// resume/step on an execution that is not currently `paused` — the
/// control plane maps the latter to its own HTTP 409 (§7).
pub async fn handle(
    execution_id: ExecutionId,
    action: ResumeAction,
    deps: &EngineDeps,
) -> Result<Execution, EngineError> {
    let execution = deps.store.get_execution(execution_id).await?;

    if action == ResumeAction::Abort {
        deps.store
            .append_event(execution_id, EventType::RunAborted, None, None, None)
            .await?;
        return Ok(deps
            .store
            .update_execution_status(execution_id, ExecutionStatus::Aborted, None, None)
            .await?);
    }

    if execution.status != ExecutionStatus::Paused {
        return Err(EngineError::NoResumeCursor);
    }

    let (Some(context_override), Some(current_node_id)) =
        (execution.final_context_json.clone(), execution.current_node_id.clone())
    else {
        return Err(EngineError::NoResumeCursor);
    };

    let call_depth = context_override
        .get("system")
        .and_then(Value::as_object)
        .and_then(|system| system.get("call_depth"))
        .and_then(Value::as_u64)
        .map_or(0, |depth| depth as u32);
    let correlation_id = context_override
        .get("system")
        .and_then(Value::as_object)
        .and_then(|system| system.get("correlation_id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    deps.store
        .append_event(
            execution_id,
            EventType::RunResumed,
            None,
            None,
            Some(json!({ "mode": action.mode_str(), "resume_node_id": current_node_id })),
        )
        .await?;

    let version = deps.store.get_workflow_version(execution.workflow_version_id).await?;

    let input = RunLoopInput {
        execution_id,
        workflow_version: Arc::new(version),
        input_json: Map::new(),
        call_depth,
        parent_execution_id: execution.parent_execution_id,
        correlation_id,
        start_node_id: Some(current_node_id),
        context_override: Some(context_override),
        is_resume: true,
    };

    run_loop::run(input, deps).await
}
