#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Sandbox
//!
//! Synchronous, dependency-free JavaScript execution for
//! `python_request`/`start_python` scripted nodes (§4.10). Every script
//! runs in a throwaway QuickJS VM with no module loader and no network,
//! filesystem, or host-process bindings — the sandbox boundary is simply
//! what the embedding never installs.

pub mod error;
pub mod script;

pub use error::SandboxError;
pub use script::{run, DEFAULT_FUNCTION};
