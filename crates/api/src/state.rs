//! Shared application state: the store and the engine dependency bundle
//! every handler needs to step a run loop.

use std::sync::Arc;

use nebula_engine::EngineDeps;
use nebula_storage::Store;

use crate::config::Settings;

/// Cloneable handle to the process's store and engine configuration,
/// injected into every `axum` handler via `State`.
#[derive(Clone)]
pub struct AppState {
    /// The durable persistence boundary.
    pub store: Arc<dyn Store>,
    /// Tunables shared by every run loop entry (`snapshot_interval`, `max_call_depth`).
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Builds a fresh [`AppState`] over `store`, per `settings`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, settings: Settings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }

    /// Builds the [`EngineDeps`] bundle for one run-loop entry. Cheap: only
    /// the `reqwest::Client` inside [`nebula_engine::http::executor::HttpExecutor`]
    /// is non-trivial to construct, and `reqwest::Client::new()` itself is a
    /// cheap `Arc` clone internally.
    #[must_use]
    pub fn engine_deps(&self) -> EngineDeps {
        EngineDeps::new(self.store.clone(), self.settings.snapshot_interval, self.settings.max_call_depth)
    }
}
