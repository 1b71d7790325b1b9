#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Engine
//!
//! The workflow interpreter: the node dispatcher (§4.7), the run loop
//! (§4.8), the sub-workflow invoker (§4.9), and the resume controller
//! (§4.11). This crate owns no durable state of its own — it steps a
//! [`nebula_execution::ExecutionContext`] against a
//! [`nebula_workflow::Graph`], appending events and snapshots through a
//! [`nebula_storage::Store`] threaded in via [`EngineDeps`].

pub mod deps;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod invoke;
pub mod resume;
pub mod run_loop;

pub use deps::EngineDeps;
pub use error::EngineError;
pub use resume::ResumeAction;
pub use run_loop::RunLoopInput;
