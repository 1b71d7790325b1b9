//! Edges and their traversal condition.

use serde::{Deserialize, Serialize};

/// The branch an edge is taken on, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCondition {
    /// Taken when the source `if` node's expression evaluates true.
    True,
    /// Taken when the source `if` node's expression evaluates false.
    False,
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Author-assigned id, unique within the graph.
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Branch label, if this edge is conditional.
    pub condition: Option<EdgeCondition>,
    /// Whether traversing this edge pauses the run before the target executes.
    pub breakpoint: bool,
}
