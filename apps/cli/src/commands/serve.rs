//! `nebula serve` — starts the HTTP control plane in-process, against a
//! fresh [`InMemoryStore`](nebula_storage::InMemoryStore) and the
//! environment's [`Settings`](nebula_api::Settings).

use std::sync::Arc;

use nebula_api::{AppState, Settings, router};
use nebula_storage::InMemoryStore;

pub async fn run(bind: String) -> anyhow::Result<()> {
    let mut settings = Settings::from_env();
    settings.bind_addr = bind;

    let bind_addr = settings.bind_addr.clone();
    let store = Arc::new(InMemoryStore::default());
    let app = router(AppState::new(store, settings));

    tracing::info!(%bind_addr, "starting nebula-server");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
