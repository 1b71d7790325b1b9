//! The normalized graph: nodes, edges, and an outgoing-edge index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::node::Node;

/// A normalized workflow graph, ready for traversal by the run loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// The id of the node traversal starts at.
    pub entry_node_id: String,
    /// All nodes, keyed by id.
    pub nodes: HashMap<String, Node>,
    /// All edges, in authored order.
    pub edges: Vec<Edge>,
    /// Outgoing edges per source node id, preserving authored order — the
    /// tie-break order used when more than one edge is eligible.
    #[serde(skip)]
    outgoing: HashMap<String, Vec<usize>>,
}

impl Graph {
    /// Builds a graph from its parts, indexing outgoing edges by source.
    #[must_use]
    pub fn new(entry_node_id: String, nodes: HashMap<String, Node>, edges: Vec<Edge>) -> Self {
        let mut outgoing: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.source.clone()).or_default().push(idx);
        }
        Self {
            entry_node_id,
            nodes,
            edges,
            outgoing,
        }
    }

    /// Returns `true` if `node_id` names a node in this graph.
    #[must_use]
    pub fn has_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Outgoing edges for `node_id`, in authored order.
    pub fn outgoing_edges(&self, node_id: &str) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(node_id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.edges[idx])
    }

    /// All nodes matching `node_type`, in no particular order.
    pub fn nodes_of_type(&self, node_type: crate::node::NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.node_type == node_type)
    }
}
