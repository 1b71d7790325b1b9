//! The run loop (§4.8): traversal, event emission, snapshotting,
//! pause/breakpoint handling, and failure propagation.

use std::sync::Arc;

use nebula_core::ExecutionId;
use nebula_execution::{Execution, ExecutionContext, ExecutionStatus, EventType};
use nebula_workflow::{Node, NodeType, WorkflowVersion};
use serde_json::{Map, Value, json};

use crate::EngineDeps;
use crate::dispatch::{control_flow, dispatch_node, variables};
use crate::error::EngineError;

/// Every precondition §4.8 lists for one entry into the loop.
pub struct RunLoopInput {
    /// The execution this call steps.
    pub execution_id: ExecutionId,
    /// The resolved, immutable graph source.
    pub workflow_version: Arc<WorkflowVersion>,
    /// Caller-supplied trigger payload (fresh runs only).
    pub input_json: Map<String, Value>,
    /// Recursion depth; `0` for a top-level run.
    pub call_depth: u32,
    /// Set when this run is a child of an `invoke_workflow` node.
    pub parent_execution_id: Option<ExecutionId>,
    /// Inherited or freshly minted correlation id.
    pub correlation_id: Option<String>,
    /// Resume-only: the node to re-enter at.
    pub start_node_id: Option<String>,
    /// Resume-only: the reconstructed `{vars, nodes, system}` context.
    pub context_override: Option<Value>,
    /// `true` when re-entering a paused execution (skips `RUN_STARTED` and
    /// `parameters` default application).
    pub is_resume: bool,
}

/// Appends `NODE_FAILED` with `reason` (no node in scope yet), marks the
/// execution `failed`, and returns it. Used for the fixed set of
/// initialization-time failures the run loop cannot recover from.
async fn fail_init(deps: &EngineDeps, execution_id: ExecutionId, reason: String) -> Result<Execution, EngineError> {
    deps.store
        .append_event(execution_id, EventType::NodeFailed, None, None, Some(json!({ "reason": reason })))
        .await?;
    Ok(deps
        .store
        .update_execution_status(execution_id, ExecutionStatus::Failed, None, None)
        .await?)
}

/// Writes a snapshot when `next_event_index` crosses `snapshot_interval`
/// (§4.8 snapshot policy).
async fn maybe_snapshot(deps: &EngineDeps, execution_id: ExecutionId, ctx: &ExecutionContext) -> Result<(), EngineError> {
    let n = deps.store.get_next_event_index(execution_id).await?;
    if n > 0 && deps.snapshot_interval > 0 && n % deps.snapshot_interval == 0 {
        let event_index = n - 1;
        deps.store.create_snapshot(execution_id, event_index, ctx.to_json()).await?;
        deps.store
            .append_event(
                execution_id,
                EventType::SnapshotWritten,
                None,
                None,
                Some(json!({ "event_index": event_index })),
            )
            .await?;
    }
    Ok(())
}

fn select_edge<'a>(
    node: &Node,
    output: &Value,
    edges: &[&'a nebula_workflow::Edge],
) -> Option<&'a nebula_workflow::Edge> {
    if node.node_type == NodeType::If {
        let result = output.get("result").and_then(Value::as_bool).unwrap_or(false);
        control_flow::select_if_edge(edges, result)
    } else {
        edges.first().copied()
    }
}

/// Steps `input`'s execution from its starting node to a terminal or paused
/// state, returning the execution row as it stood at that point.
pub async fn run(input: RunLoopInput, deps: &EngineDeps) -> Result<Execution, EngineError> {
    let execution_id = input.execution_id;

    if input.call_depth > deps.max_call_depth {
        return fail_init(
            deps,
            execution_id,
            EngineError::CallDepthExceeded {
                depth: input.call_depth,
                max: deps.max_call_depth,
            }
            .to_string(),
        )
        .await;
    }

    let graph = match input.workflow_version.graph() {
        Ok(graph) => graph,
        Err(err) => return fail_init(deps, execution_id, err.to_string()).await,
    };

    if !graph.has_node(&graph.entry_node_id) {
        return fail_init(
            deps,
            execution_id,
            format!("entry node `{}` not found in graph", graph.entry_node_id),
        )
        .await;
    }

    let mut ctx = if input.is_resume {
        let Some(override_json) = input.context_override.as_ref() else {
            return Err(EngineError::NoResumeCursor);
        };
        ExecutionContext::from_json(override_json)
    } else {
        let mut ctx = ExecutionContext::new_initial(
            execution_id,
            &input.input_json,
            input.call_depth,
            input.parent_execution_id,
            input.correlation_id.as_deref(),
        );
        variables::apply_parameter_defaults(&graph, &mut ctx);
        ctx
    };

    let mut current_node_id = if input.is_resume {
        match input.start_node_id.clone() {
            Some(id) => id,
            None => return Err(EngineError::NoResumeCursor),
        }
    } else {
        deps.store.append_event(execution_id, EventType::RunStarted, None, None, None).await?;
        graph.entry_node_id.clone()
    };

    loop {
        let Some(node) = graph.node(&current_node_id) else {
            return Err(EngineError::GraphInvalid(format!(
                "node `{current_node_id}` referenced but not present in graph"
            )));
        };

        deps.store
            .update_execution_status(
                execution_id,
                ExecutionStatus::Running,
                Some(current_node_id.clone()),
                Some(ctx.to_json()),
            )
            .await?;
        deps.store
            .append_event(
                execution_id,
                EventType::NodeStarted,
                Some(current_node_id.clone()),
                None,
                Some(json!({ "node_type": node.node_type.as_str(), "label": node.label })),
            )
            .await?;

        let node_type = node.node_type;
        let label = node.label.clone();

        let output = match dispatch_node(node, &graph, &mut ctx, deps).await {
            Ok(output) => {
                ctx.record_node(
                    &current_node_id,
                    json!({
                        "status": "success",
                        "node_type": node_type.as_str(),
                        "label": label,
                        "output": output,
                    }),
                );
                deps.store
                    .append_event(
                        execution_id,
                        EventType::NodeSucceeded,
                        Some(current_node_id.clone()),
                        None,
                        Some(json!({ "output": output })),
                    )
                    .await?;
                maybe_snapshot(deps, execution_id, &ctx).await?;
                output
            }
            Err(err) => {
                ctx.record_node(
                    &current_node_id,
                    json!({
                        "status": "failed",
                        "node_type": node_type.as_str(),
                        "label": label,
                        "error": err.to_string(),
                        "error_kind": err.kind(),
                    }),
                );
                deps.store
                    .append_event(
                        execution_id,
                        EventType::NodeFailed,
                        Some(current_node_id.clone()),
                        None,
                        Some(json!({ "error": err.to_string(), "error_kind": err.kind() })),
                    )
                    .await?;
                maybe_snapshot(deps, execution_id, &ctx).await?;
                return Ok(deps
                    .store
                    .update_execution_status(
                        execution_id,
                        ExecutionStatus::Failed,
                        Some(current_node_id.clone()),
                        Some(ctx.to_json()),
                    )
                    .await?);
            }
        };

        if node_type == NodeType::End {
            deps.store
                .append_event(execution_id, EventType::RunCompleted, None, None, None)
                .await?;
            maybe_snapshot(deps, execution_id, &ctx).await?;
            return Ok(deps
                .store
                .update_execution_status(
                    execution_id,
                    ExecutionStatus::Completed,
                    Some(current_node_id.clone()),
                    Some(ctx.to_json()),
                )
                .await?);
        }

        let edges: Vec<&nebula_workflow::Edge> = graph.outgoing_edges(&current_node_id).collect();
        let Some(edge) = select_edge(node, &output, &edges) else {
            deps.store
                .append_event(
                    execution_id,
                    EventType::RunCompleted,
                    None,
                    None,
                    Some(json!({ "reason": "No outgoing edge" })),
                )
                .await?;
            maybe_snapshot(deps, execution_id, &ctx).await?;
            return Ok(deps
                .store
                .update_execution_status(
                    execution_id,
                    ExecutionStatus::Completed,
                    Some(current_node_id.clone()),
                    Some(ctx.to_json()),
                )
                .await?);
        };

        if edge.breakpoint {
            deps.store
                .append_event(
                    execution_id,
                    EventType::BreakpointPaused,
                    None,
                    Some(edge.id.clone()),
                    Some(json!({ "source": edge.source, "target": edge.target })),
                )
                .await?;
            maybe_snapshot(deps, execution_id, &ctx).await?;
            return Ok(deps
                .store
                .update_execution_status(
                    execution_id,
                    ExecutionStatus::Paused,
                    Some(edge.target.clone()),
                    Some(ctx.to_json()),
                )
                .await?);
        }

        deps.store
            .append_event(execution_id, EventType::EdgeTraversed, None, Some(edge.id.clone()), None)
            .await?;
        current_node_id = edge.target.clone();
        maybe_snapshot(deps, execution_id, &ctx).await?;
    }
}
