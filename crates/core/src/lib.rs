//! # Nebula Core
//!
//! Core types shared by every Nebula workflow-engine crate: strongly-typed
//! identifiers and the common error type they parse into.

pub mod id;

// Re-export main types for convenience
pub use id::*;

// Re-export common error types
pub use error::*;

mod error;

/// Result type used throughout Nebula
pub type Result<T> = std::result::Result<T, error::CoreError>;

/// Common prelude for Nebula crates
pub mod prelude {
    pub use super::{CoreError, ExecutionId, NodeId, Result, UuidParseError, WorkflowId};
}
