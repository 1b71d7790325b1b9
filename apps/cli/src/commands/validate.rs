//! `nebula validate` — parses and normalizes a workflow graph JSON file
//! without creating a workflow or stepping the run loop.

use std::path::Path;

use anyhow::Context;
use nebula_workflow::normalize_graph;

pub fn run(path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let graph_json: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))?;

    match normalize_graph(&graph_json) {
        Ok(graph) => {
            println!(
                "valid: {} node(s), {} edge(s), entry = {}",
                graph.nodes.len(),
                graph.edges.len(),
                graph.entry_node_id
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("invalid: {err}");
            std::process::exit(1);
        }
    }
}
