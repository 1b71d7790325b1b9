//! The control-plane binary: loads [`Settings`](nebula_api::Settings) from
//! the environment, wires an [`InMemoryStore`](nebula_storage::InMemoryStore),
//! and serves the router on `bind_addr`.

use std::sync::Arc;

use nebula_api::{router, AppState, Settings};
use nebula_log::LogConfig;
use nebula_storage::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nebula_log::init(&LogConfig::default()).expect("default log config is always valid");

    let settings = Settings::from_env();
    let bind_addr = settings.bind_addr.clone();
    let store = Arc::new(InMemoryStore::default());
    let state = AppState::new(store, settings);
    let app = router(state);

    tracing::info!(%bind_addr, "starting nebula-server");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
