#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Execution
//!
//! The data model and mutable runtime state of one workflow run: the
//! [`Execution`] record, its append-only [`ExecutionEvent`] log and
//! [`EventType`] vocabulary, periodic [`ExecutionSnapshot`]s, the
//! [`SavedOutput`] side channel, and the in-memory [`ExecutionContext`] the
//! run loop mutates while stepping through a graph.
//!
//! This crate models execution-time *data*; it performs no traversal and
//! contains no I/O. The run loop living in `nebula-engine` is the only
//! writer of `nodes` and the only caller that advances `current_node_id`.

pub mod context;
pub mod error;
pub mod event;
pub mod execution;
pub mod path;
pub mod saved_output;
pub mod snapshot;
pub mod status;

pub use context::ExecutionContext;
pub use error::ExecutionError;
pub use event::{EventType, ExecutionEvent};
pub use execution::Execution;
pub use path::resolve_path;
pub use saved_output::SavedOutput;
pub use snapshot::ExecutionSnapshot;
pub use status::ExecutionStatus;
