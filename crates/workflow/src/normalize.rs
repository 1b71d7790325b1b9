//! Normalizes author-shaped or legacy-shaped graph JSON into a [`Graph`].
//!
//! Two node shapes are accepted:
//! - authored: `{ id, data: { nodeType, config, label } }`
//! - legacy: `{ id, type, config, label }`
//!
//! An edge's condition is read from `data.condition` when present, else
//! derived from `sourceHandle` when it is literally `"true"` or `"false"`.

use std::collections::HashMap;

use serde_json::Value;

use crate::edge::{Edge, EdgeCondition};
use crate::error::WorkflowError;
use crate::graph::Graph;
use crate::node::{Node, NodeType};

/// Parses `raw` (the `graph_json` stored on a workflow version) into a [`Graph`].
pub fn normalize_graph(raw: &Value) -> Result<Graph, WorkflowError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| WorkflowError::GraphInvalid("graph_json must be an object".into()))?;

    let entry_node_id = obj
        .get("entry_node_id")
        .or_else(|| obj.get("entryNodeId"))
        .and_then(Value::as_str)
        .ok_or_else(|| WorkflowError::EntryNodeMissing("entry_node_id is missing".into()))?
        .to_string();

    let raw_nodes = obj
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| WorkflowError::GraphInvalid("nodes must be an array".into()))?;

    let mut nodes = HashMap::with_capacity(raw_nodes.len());
    for raw_node in raw_nodes {
        let node = normalize_node(raw_node)?;
        if nodes.insert(node.id.clone(), node).is_some() {
            let id = raw_node
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(WorkflowError::DuplicateNodeId(id));
        }
    }

    if !nodes.contains_key(&entry_node_id) {
        return Err(WorkflowError::EntryNodeMissing(entry_node_id));
    }

    let raw_edges = obj
        .get("edges")
        .and_then(Value::as_array)
        .ok_or_else(|| WorkflowError::GraphInvalid("edges must be an array".into()))?;

    let edges = raw_edges.iter().map(normalize_edge).collect::<Result<Vec<_>, _>>()?;

    Ok(Graph::new(entry_node_id, nodes, edges))
}

fn normalize_node(raw: &Value) -> Result<Node, WorkflowError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| WorkflowError::GraphInvalid("node must be an object".into()))?;

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| WorkflowError::GraphInvalid("node is missing id".into()))?
        .to_string();

    // Authored shape nests everything under `data`; legacy shape is flat.
    let data = obj.get("data").and_then(Value::as_object);

    let type_str = data
        .and_then(|d| d.get("nodeType"))
        .or_else(|| obj.get("type"))
        .and_then(Value::as_str)
        .ok_or_else(|| WorkflowError::GraphInvalid(format!("node {id} is missing a type")))?;
    let node_type = NodeType::parse(type_str)?;

    let label = data
        .and_then(|d| d.get("label"))
        .or_else(|| obj.get("label"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());

    let config = data
        .and_then(|d| d.get("config"))
        .or_else(|| obj.get("config"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Ok(Node {
        id,
        node_type,
        label,
        config,
    })
}

fn normalize_edge(raw: &Value) -> Result<Edge, WorkflowError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| WorkflowError::GraphInvalid("edge must be an object".into()))?;

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let source = obj
        .get("source")
        .and_then(Value::as_str)
        .ok_or_else(|| WorkflowError::GraphInvalid(format!("edge {id} is missing source")))?
        .to_string();
    let target = obj
        .get("target")
        .and_then(Value::as_str)
        .ok_or_else(|| WorkflowError::GraphInvalid(format!("edge {id} is missing target")))?
        .to_string();

    let data = obj.get("data").and_then(Value::as_object);
    let condition_str = data
        .and_then(|d| d.get("condition"))
        .and_then(Value::as_str)
        .or_else(|| obj.get("sourceHandle").and_then(Value::as_str));

    let condition = match condition_str {
        Some("true") => Some(EdgeCondition::True),
        Some("false") => Some(EdgeCondition::False),
        _ => None,
    };

    let breakpoint = data
        .and_then(|d| d.get("breakpoint"))
        .or_else(|| obj.get("breakpoint"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(Edge {
        id,
        source,
        target,
        condition,
        breakpoint,
    })
}
