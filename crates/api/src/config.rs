//! Layered configuration (§6): loaded from environment with `serde`,
//! exposing exactly the documented keys plus the ambient `bind_addr` every
//! `axum` service in this workspace needs.

use std::env;

/// The control plane's runtime configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Connection string for the durable store. Unused by [`nebula_storage::InMemoryStore`]
    /// but named here so a real backend can be swapped in without an API change.
    pub database_url: String,
    /// Write a context snapshot every time the event log crosses a multiple
    /// of this value (§4.8, default 25).
    pub snapshot_interval: u64,
    /// The ceiling `invoke_workflow` recursion may not exceed (§4.9, default 8).
    pub max_call_depth: u32,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "memory://nebula".to_string(),
            snapshot_interval: 25,
            max_call_depth: 8,
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the process environment, falling back to
    /// defaults for any key that is unset or fails to parse.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            snapshot_interval: env::var("SNAPSHOT_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.snapshot_interval),
            max_call_depth: env::var("MAX_CALL_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_call_depth),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}
