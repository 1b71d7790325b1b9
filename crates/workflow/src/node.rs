//! Node types and the canonical, normalized node record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::WorkflowError;

/// The fixed vocabulary of node types the engine knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Graph entry marker; carries no behavior beyond recording its output.
    Start,
    /// Graph exit marker; terminates the run as `completed`.
    End,
    /// Resolves a value by path and assigns it to `vars[name]`.
    DefineVariable,
    /// Declares named parameters with defaults, applied once at run start.
    Parameters,
    /// Declares a named auth entry consumable by `authRef`.
    Auth,
    /// Sleeps for a configured number of milliseconds.
    Delay,
    /// Evaluates a boolean expression and selects an outgoing edge.
    If,
    /// Records fan-out intent over a resolved list.
    ForEachParallel,
    /// Merges fan-out state per a configured strategy.
    Join,
    /// Issues an HTTP request.
    StartRequest,
    /// Issues an HTTP request with a form-encoded body.
    FormRequest,
    /// Issues a paginated sequence of HTTP requests.
    PaginateRequest,
    /// Runs a sandboxed script and treats a non-response result as a response body.
    PythonRequest,
    /// Runs a sandboxed script and merges its result into `vars`.
    StartPython,
    /// Synchronously invokes a child workflow execution.
    InvokeWorkflow,
    /// Appends a named value to the saved-output side channel.
    Save,
    /// Raises a `NodeRaised` error with a rendered message.
    RaiseError,
}

impl NodeType {
    /// Parses a node type from its wire name (authored or legacy JSON).
    pub fn parse(raw: &str) -> Result<Self, WorkflowError> {
        Ok(match raw {
            "start" => Self::Start,
            "end" => Self::End,
            "define_variable" => Self::DefineVariable,
            "parameters" => Self::Parameters,
            "auth" => Self::Auth,
            "delay" => Self::Delay,
            "if" => Self::If,
            "for_each_parallel" => Self::ForEachParallel,
            "join" => Self::Join,
            "start_request" => Self::StartRequest,
            "form_request" => Self::FormRequest,
            "paginate_request" => Self::PaginateRequest,
            "python_request" => Self::PythonRequest,
            "start_python" => Self::StartPython,
            "invoke_workflow" => Self::InvokeWorkflow,
            "save" => Self::Save,
            "raise_error" => Self::RaiseError,
            other => return Err(WorkflowError::UnknownNodeType(other.to_string())),
        })
    }

    /// The wire name used when re-serializing a node type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::DefineVariable => "define_variable",
            Self::Parameters => "parameters",
            Self::Auth => "auth",
            Self::Delay => "delay",
            Self::If => "if",
            Self::ForEachParallel => "for_each_parallel",
            Self::Join => "join",
            Self::StartRequest => "start_request",
            Self::FormRequest => "form_request",
            Self::PaginateRequest => "paginate_request",
            Self::PythonRequest => "python_request",
            Self::StartPython => "start_python",
            Self::InvokeWorkflow => "invoke_workflow",
            Self::Save => "save",
            Self::RaiseError => "raise_error",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized node: author-assigned id, type, label, and config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Author-assigned id, unique within the graph.
    pub id: String,
    /// The node's behavior.
    pub node_type: NodeType,
    /// Human-readable label (defaults to the node id when absent).
    pub label: String,
    /// Node-type-specific configuration object (empty object when absent).
    pub config: Map<String, Value>,
}
