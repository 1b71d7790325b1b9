//! Shared dependencies threaded through the run loop, dispatcher, and
//! invoker. Bundled into one struct so every recursive call site (plain
//! node dispatch, `invoke_workflow` recursion, resume) takes a single
//! borrow instead of four or five separate arguments.

use std::sync::Arc;

use nebula_storage::Store;

use crate::http::executor::HttpExecutor;

/// The engine's external collaborators plus the two configured tunables
/// (`snapshot_interval`, `max_call_depth`).
pub struct EngineDeps {
    /// The durable persistence boundary (§4.1).
    pub store: Arc<dyn Store>,
    /// The shared HTTP client used by every `start_request`/`form_request`/
    /// `paginate_request` node.
    pub http: HttpExecutor,
    /// Write a snapshot every time `next_event_index` crosses a multiple
    /// of this value (default 25, §4.8).
    pub snapshot_interval: u64,
    /// The ceiling `invoke_workflow` recursion may not exceed (default 8, §4.9).
    pub max_call_depth: u32,
}

impl EngineDeps {
    /// Builds a dependency bundle from a store and the two configured
    /// tunables, with a fresh [`HttpExecutor`].
    #[must_use]
    pub fn new(store: Arc<dyn Store>, snapshot_interval: u64, max_call_depth: u32) -> Self {
        Self {
            store,
            http: HttpExecutor::new(),
            snapshot_interval,
            max_call_depth,
        }
    }
}
