//! Serves the deletion-event handler over HTTP.
//!
//! Point a Firestore "document created" trigger for `deleted_users/{docId}` (JSON event
//! encoding) at `POST /`. Listens on `0.0.0.0:$PORT` (default 8080).

use firebase_user_purge::config::PurgeConfig;
use firebase_user_purge::core::init_tracing;
use firebase_user_purge::trigger::{router, TriggerState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = PurgeConfig::from_env()?;
    let app = config.load_app().await?;

    let state = TriggerState {
        directory: Arc::new(app.auth()),
        store: Arc::new(app.firestore()),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, project = app.project_id(), "listening for deletion markers");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
