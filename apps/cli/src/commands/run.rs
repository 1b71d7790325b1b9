//! `nebula run` — loads a workflow graph JSON file into a throwaway
//! [`InMemoryStore`](nebula_storage::InMemoryStore), creates a workflow and
//! a single published version for it, and steps the run loop to
//! completion (or first pause), printing the resulting execution row.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use nebula_core::{ExecutionId, WorkflowId};
use nebula_engine::{EngineDeps, RunLoopInput, run_loop};
use nebula_execution::Execution;
use nebula_storage::{InMemoryStore, Store};
use nebula_workflow::{Workflow, WorkflowVersion};
use serde_json::Map;

pub async fn run(path: &Path, input: Option<&Path>, debug: bool) -> anyhow::Result<()> {
    let graph_raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let graph_json: serde_json::Value =
        serde_json::from_str(&graph_raw).with_context(|| format!("{} is not valid JSON", path.display()))?;

    let input_json: Map<String, serde_json::Value> = match input {
        Some(p) => {
            let raw = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            match serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON object", p.display()))? {
                serde_json::Value::Object(map) => map,
                _ => anyhow::bail!("{} must contain a JSON object", p.display()),
            }
        }
        None => Map::new(),
    };

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::default());

    let workflow = Workflow {
        id: WorkflowId::v4(),
        name: path.display().to_string(),
        description: None,
        created_by: None,
        created_at: Utc::now(),
    };
    let workflow = store.create_workflow(workflow).await?;

    let version = WorkflowVersion {
        id: WorkflowId::v4(),
        workflow_id: workflow.id,
        version_number: 1,
        graph_json,
        version_note: None,
        version_tag: None,
        is_published: true,
        created_by: None,
        created_at: Utc::now(),
    };
    let version = store.create_workflow_version(version).await?;

    let execution = Execution::new(ExecutionId::v4(), version.id, Utc::now(), debug, None, Some("cli".to_string()), None, None, None);
    let execution = store.create_execution(execution).await?;

    let deps = EngineDeps::new(store.clone(), 25, 8);
    let input = RunLoopInput {
        execution_id: execution.id,
        workflow_version: Arc::new(version),
        input_json,
        call_depth: 0,
        parent_execution_id: None,
        correlation_id: None,
        start_node_id: None,
        context_override: None,
        is_resume: false,
    };

    let finished = run_loop::run(input, &deps).await?;
    println!("{}", serde_json::to_string_pretty(&finished)?);
    Ok(())
}
