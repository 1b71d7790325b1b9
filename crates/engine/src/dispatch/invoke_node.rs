//! `invoke_workflow` dispatch (§4.7): thin bridge to [`crate::invoke::invoke_child`].

use nebula_execution::ExecutionContext;
use nebula_workflow::Node;
use serde_json::Value;

use crate::EngineDeps;
use crate::error::EngineError;
use crate::invoke::invoke_child;

/// Recursively runs the target child workflow and returns its summary.
pub async fn invoke_workflow(
    node: &Node,
    ctx: &mut ExecutionContext,
    deps: &EngineDeps,
) -> Result<Value, EngineError> {
    invoke_child(node, ctx, deps).await
}
