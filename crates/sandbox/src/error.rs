//! Errors surfaced by script execution.

use thiserror::Error;

/// Failure modes for a sandboxed script call.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The script failed to parse or otherwise could not be compiled.
    #[error("script compilation failed: {0}")]
    Compile(String),

    /// The script threw an uncaught JavaScript exception.
    #[error("script threw: {0}")]
    Thrown(String),

    /// The named entry point function does not exist on the global object.
    #[error("function `{0}` is not defined")]
    NoSuchFunction(String),

    /// The script did not return within its step time budget.
    #[error("script exceeded its time budget")]
    Timeout,

    /// The script's return value could not be serialized to JSON, or the
    /// context could not be serialized into the script's global scope.
    #[error("value was not JSON-compatible: {0}")]
    NotJson(#[from] serde_json::Error),

    /// Setting up or tearing down the embedded VM failed.
    #[error("sandbox runtime error: {0}")]
    Runtime(String),
}
