//! The sub-workflow invoker (§4.9): resolves a target workflow version,
//! builds a child execution, and recurses into [`crate::run_loop::run`].

use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;
use nebula_core::{ExecutionId, WorkflowId};
use nebula_execution::{Execution, ExecutionContext, ExecutionStatus, EventType};
use nebula_workflow::{Node, WorkflowVersion};
use serde_json::{Map, Value, json};

use crate::EngineDeps;
use crate::error::EngineError;
use crate::run_loop::{self, RunLoopInput};

/// Resolves `invoke_workflow` config into the target version to run.
async fn resolve_target(node: &Node, deps: &EngineDeps) -> Result<WorkflowVersion, EngineError> {
    if let Some(version_id) = node.config.get("targetWorkflowVersionId").and_then(Value::as_str) {
        let id = WorkflowId::parse(version_id)
            .map_err(|err| EngineError::ValidationError(format!("invalid targetWorkflowVersionId: {err}")))?;
        return Ok(deps.store.get_workflow_version(id).await?);
    }

    if let Some(workflow_id) = node.config.get("targetWorkflowId").and_then(Value::as_str) {
        let id = WorkflowId::parse(workflow_id)
            .map_err(|err| EngineError::ValidationError(format!("invalid targetWorkflowId: {err}")))?;
        let published_only = node
            .config
            .get("publishedOnly")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        return Ok(if published_only {
            deps.store.get_latest_published_workflow_version(id).await?
        } else {
            deps.store.get_latest_workflow_version(id).await?
        });
    }

    Err(EngineError::InvokeTargetMissing)
}

/// Resolves the child's `input_json` per `inputMode` (`inherit` or `from_var`).
fn resolve_child_input(node: &Node, ctx: &ExecutionContext) -> Result<Map<String, Value>, EngineError> {
    let mode = node.config.get("inputMode").and_then(Value::as_str).unwrap_or("inherit");
    let resolved = match mode {
        "from_var" => {
            let path = node
                .config
                .get("inputSource")
                .and_then(Value::as_str)
                .ok_or_else(|| EngineError::ValidationError("inputMode `from_var` requires inputSource".to_string()))?;
            crate::dispatch::template_root(ctx).resolve(path)
        }
        _ => ctx.vars.get("input").cloned().unwrap_or(Value::Object(Map::new())),
    };

    resolved
        .as_object()
        .cloned()
        .ok_or_else(|| EngineError::ValidationError("invoke_workflow input must resolve to an object".to_string()))
}

/// Runs the child execution synchronously and returns the node's output.
/// Boxed because this indirectly recurses into [`crate::run_loop::run`],
/// which would otherwise give the future an infinite size.
pub fn invoke_child<'a>(
    node: &'a Node,
    ctx: &'a mut ExecutionContext,
    deps: &'a EngineDeps,
) -> BoxFuture<'a, Result<Value, EngineError>> {
    Box::pin(async move {
        let depth = ctx.call_depth() + 1;
        if depth > deps.max_call_depth {
            return Err(EngineError::CallDepthExceeded {
                depth,
                max: deps.max_call_depth,
            });
        }

        let version = resolve_target(node, deps).await?;
        let version_id = version.id;
        let input_json = resolve_child_input(node, ctx)?;

        let parent_execution_id: ExecutionId = ctx
            .execution_id()
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| EngineError::ValidationError("execution context has no execution_id".to_string()))?;
        let correlation_id = ctx
            .system
            .get("correlation_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| parent_execution_id.to_string());

        let child_execution = Execution::new(
            ExecutionId::v4(),
            version_id,
            Utc::now(),
            false,
            Some(parent_execution_id),
            Some("invoke_workflow".to_string()),
            None,
            None,
            Some(correlation_id.clone()),
        );
        let child_execution = deps.store.create_execution(child_execution).await?;

        deps.store
            .append_event(
                parent_execution_id,
                EventType::InvokeWorkflowStarted,
                Some(node.id.clone()),
                None,
                Some(json!({
                    "child_execution_id": child_execution.id.to_string(),
                    "child_workflow_version_id": version_id.to_string(),
                })),
            )
            .await?;

        let child_input = RunLoopInput {
            execution_id: child_execution.id,
            workflow_version: Arc::new(version),
            input_json,
            call_depth: depth,
            parent_execution_id: Some(parent_execution_id),
            correlation_id: Some(correlation_id),
            start_node_id: None,
            context_override: None,
            is_resume: false,
        };

        let finished = run_loop::run(child_input, deps).await?;
        if finished.status != ExecutionStatus::Completed {
            return Err(EngineError::InvokeChildFailed {
                child_execution_id: finished.id.to_string(),
                status: finished.status.to_string(),
            });
        }

        deps.store
            .append_event(
                parent_execution_id,
                EventType::InvokeWorkflowSucceeded,
                Some(node.id.clone()),
                None,
                Some(json!({ "child_execution_id": finished.id.to_string() })),
            )
            .await?;

        let child_final_context = finished.final_context_json.clone().unwrap_or(Value::Null);
        Ok(json!({
            "child_execution_id": finished.id.to_string(),
            "child_workflow_version_id": version_id.to_string(),
            "child_final_context": child_final_context,
        }))
    })
}
