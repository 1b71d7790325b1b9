//! Errors produced while parsing and validating a workflow graph.

/// Errors from graph normalization and workflow/version bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The graph JSON was not an object, or its `nodes`/`edges` arrays were malformed.
    #[error("graph is invalid: {0}")]
    GraphInvalid(String),

    /// `entry_node_id` was missing from the graph, or did not name a known node.
    #[error("entry node is missing or unknown: {0}")]
    EntryNodeMissing(String),

    /// A node declared a `node_type` outside the known enum.
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    /// A node id was reused within one graph.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),
}
