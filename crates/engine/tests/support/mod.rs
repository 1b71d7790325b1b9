//! Shared fixtures for the engine's integration tests: a fresh in-memory
//! store, a workflow version built from inline graph JSON, and helpers to
//! drive a run through [`nebula_engine::run_loop`] without going through
//! the HTTP control plane.

use std::sync::Arc;

#![allow(dead_code)]

use chrono::Utc;
use nebula_core::{ExecutionId, WorkflowId};
use nebula_engine::{EngineDeps, RunLoopInput};
use nebula_execution::Execution;
use nebula_storage::{InMemoryStore, Store};
use nebula_workflow::WorkflowVersion;
use serde_json::{Map, Value};

/// Builds an [`EngineDeps`] over a fresh store with the given tunables.
#[must_use]
pub fn deps(store: Arc<dyn Store>, snapshot_interval: u64, max_call_depth: u32) -> EngineDeps {
    EngineDeps::new(store, snapshot_interval, max_call_depth)
}

/// Persists `graph_json` as a freshly minted, published workflow version.
pub async fn publish_version(store: &dyn Store, graph_json: Value) -> WorkflowVersion {
    let version = WorkflowVersion {
        id: WorkflowId::v4(),
        workflow_id: WorkflowId::v4(),
        version_number: 1,
        graph_json,
        version_note: None,
        version_tag: None,
        is_published: true,
        created_by: None,
        created_at: Utc::now(),
    };
    store.create_workflow_version(version).await.unwrap()
}

/// Persists `graph_json` as a published version under a caller-chosen
/// `workflow_id` (used when a test needs to reference the workflow by id,
/// e.g. `invoke_workflow`'s `targetWorkflowId`).
pub async fn publish_version_for(store: &dyn Store, workflow_id: WorkflowId, graph_json: Value) -> WorkflowVersion {
    let version = WorkflowVersion {
        id: WorkflowId::v4(),
        workflow_id,
        version_number: 1,
        graph_json,
        version_note: None,
        version_tag: None,
        is_published: true,
        created_by: None,
        created_at: Utc::now(),
    };
    store.create_workflow_version(version).await.unwrap()
}

/// Creates a fresh `Running` execution row for `version`.
pub async fn new_execution(store: &dyn Store, version: &WorkflowVersion) -> Execution {
    let execution = Execution::new(
        ExecutionId::v4(),
        version.id,
        Utc::now(),
        false,
        None,
        Some("test".to_string()),
        None,
        None,
        None,
    );
    store.create_execution(execution).await.unwrap()
}

/// A top-level, fresh-run [`RunLoopInput`] for `execution_id`/`version`.
#[must_use]
pub fn fresh_run(execution_id: ExecutionId, version: Arc<WorkflowVersion>, input_json: Value) -> RunLoopInput {
    RunLoopInput {
        execution_id,
        workflow_version: version,
        input_json: input_json.as_object().cloned().unwrap_or_default(),
        call_depth: 0,
        parent_execution_id: None,
        correlation_id: None,
        start_node_id: None,
        context_override: None,
        is_resume: false,
    }
}

/// Convenience: publishes `graph_json`, creates an execution for it, and
/// runs it to completion or pause in one call.
pub async fn run_graph(
    store: &Arc<dyn Store>,
    deps: &EngineDeps,
    graph_json: Value,
    input_json: Value,
) -> Execution {
    let version = publish_version(store.as_ref(), graph_json).await;
    let execution = new_execution(store.as_ref(), &version).await;
    let input = fresh_run(execution.id, Arc::new(version), input_json);
    nebula_engine::run_loop::run(input, deps).await.unwrap()
}

#[must_use]
pub fn empty_input() -> Map<String, Value> {
    Map::new()
}
