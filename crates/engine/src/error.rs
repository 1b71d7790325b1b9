//! Engine-internal error vocabulary (§7). Every variant here either
//! becomes a `NODE_FAILED` payload inside the run loop or crosses the
//! control-plane boundary as an HTTP 4xx/5xx in `nebula-api`.

use nebula_expression::ExpressionError;
use nebula_sandbox::SandboxError;
use nebula_storage::StoreError;
use nebula_workflow::WorkflowError;
use thiserror::Error;

/// Failure modes the run loop, dispatcher, invoker, and resume controller
/// can raise.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The graph is missing its entry node, references an unknown node
    /// type, or otherwise failed normalization.
    #[error("graph is invalid: {0}")]
    GraphInvalid(String),

    /// An `invoke_workflow` chain would exceed `max_call_depth`.
    #[error("call depth {depth} exceeds the configured maximum {max}")]
    CallDepthExceeded {
        /// The depth the child execution would run at.
        depth: u32,
        /// The configured ceiling.
        max: u32,
    },

    /// `invoke_workflow` config names no resolvable target.
    #[error("invoke_workflow node is missing a target workflow or version id")]
    InvokeTargetMissing,

    /// A child execution invoked via `invoke_workflow` did not complete.
    #[error("child execution {child_execution_id} ended in status `{status}` instead of completed")]
    InvokeChildFailed {
        /// The child execution's id, for correlation.
        child_execution_id: String,
        /// The child's terminal (or otherwise non-completed) status.
        status: String,
    },

    /// An expression or template exceeded the evaluator's AST node budget.
    #[error("expression exceeded its complexity budget: {0}")]
    ExpressionTooComplex(#[source] ExpressionError),

    /// Any other expression/template evaluation failure.
    #[error("expression evaluation failed: {0}")]
    Expression(ExpressionError),

    /// A transport-level HTTP failure not mapped to a response status.
    #[error("upstream request failed: {0}")]
    UpstreamFailure(String),

    /// The resilience wrapper's circuit breaker was open for this node.
    #[error("circuit breaker open for node `{node_id}`")]
    CircuitOpen {
        /// The node whose breaker tripped.
        node_id: String,
    },

    /// A `raise_error` node fired.
    #[error("{0}")]
    NodeRaised(String),

    /// A resume/step request found no usable cursor on the execution.
    #[error("execution has no resume cursor")]
    NoResumeCursor,

    /// Malformed input at the control-plane boundary.
    #[error("validation failed: {0}")]
    ValidationError(String),

    /// A script threw, timed out, or otherwise failed inside the sandbox.
    #[error("scripted node failed: {0}")]
    Sandbox(#[from] SandboxError),

    /// A durability operation failed; fatal to the run loop (§7: "A failure
    /// during append-event or status-update is fatal to the loop").
    #[error("storage operation failed: {0}")]
    Store(#[from] StoreError),

    /// Graph normalization failed while resolving a workflow version.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// Maps an expression/template failure onto the engine's error vocabulary,
/// distinguishing a budget overrun (§7 `ExpressionTooComplex`) from any
/// other evaluator rejection (§7 `ExpressionError`).
#[must_use]
pub fn map_expression_error(err: ExpressionError) -> EngineError {
    if matches!(err, ExpressionError::TooComplex { .. }) {
        EngineError::ExpressionTooComplex(err)
    } else {
        EngineError::Expression(err)
    }
}

impl EngineError {
    /// Renders this error as the `reason`/`error` string recorded on a
    /// failed node and in `NODE_FAILED` payloads.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GraphInvalid(_) | Self::Workflow(_) => "GraphInvalid",
            Self::CallDepthExceeded { .. } => "CallDepthExceeded",
            Self::InvokeTargetMissing => "InvokeTargetMissing",
            Self::InvokeChildFailed { .. } => "InvokeChildFailed",
            Self::ExpressionTooComplex(_) => "ExpressionTooComplex",
            Self::Expression(_) => "ExpressionError",
            Self::UpstreamFailure(_) => "UpstreamFailure",
            Self::CircuitOpen { .. } => "CircuitOpen",
            Self::NodeRaised(_) => "NodeRaised",
            Self::NoResumeCursor => "NoResumeCursor",
            Self::ValidationError(_) => "ValidationError",
            Self::Sandbox(_) => "SandboxError",
            Self::Store(_) => "StoreError",
        }
    }
}
