//! Workflow and workflow-version identity and metadata.

use chrono::{DateTime, Utc};
use nebula_core::WorkflowId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named, versioned graph authored by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Opaque identity.
    pub id: WorkflowId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Who created this workflow, if known.
    pub created_by: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An immutable graph snapshot belonging to a [`Workflow`], numbered 1..n.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowVersion {
    /// Opaque identity, distinct from the owning workflow's id.
    pub id: WorkflowId,
    /// The workflow this version belongs to.
    pub workflow_id: WorkflowId,
    /// 1-indexed, monotonic within a workflow.
    pub version_number: u32,
    /// The raw graph JSON, in either the authored or legacy shape.
    pub graph_json: Value,
    /// Optional free-text note left by the author.
    pub version_note: Option<String>,
    /// Optional short tag (e.g. `"v1.2"`), not required to be unique.
    pub version_tag: Option<String>,
    /// Whether run-creation that resolves "latest published" may select this version.
    pub is_published: bool,
    /// Who created this version, if known.
    pub created_by: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl WorkflowVersion {
    /// Parses and indexes this version's `graph_json` into a [`crate::graph::Graph`].
    pub fn graph(&self) -> Result<crate::graph::Graph, crate::error::WorkflowError> {
        crate::normalize::normalize_graph(&self.graph_json)
    }
}
