#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula API
//!
//! The HTTP control plane (§6): workflow authoring, run-control requests,
//! and run/event/state inspection. Named out of scope for engine
//! internals but in-scope as an interface — this crate is a thin `axum`
//! façade over [`nebula_engine`] and [`nebula_storage`]; it contains no
//! interpreter logic of its own.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Settings;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
