//! # Nebula Expression
//!
//! The sandboxed expression and `{{ }}` template evaluator used when
//! resolving node config: field access, indexing, arithmetic, comparisons,
//! boolean connectives, and a fixed builtin table — no assignment, no
//! attribute mutation, no access to the host runtime, no arbitrary function
//! resolution, no imports.

pub mod builtins;
pub mod context;
pub mod core;
pub mod error;
pub mod eval;
pub mod template;

pub use context::{TemplateRoot, looks_like_expression, resolve_path};
pub use error::ExpressionError;
pub use eval::{eval, eval_str};
pub use template::{Template, render_value};

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, ExpressionError>;
