//! server
//!
//! HTTP surface over the vault.
//!
//! # Routes
//!
//! | Method | Path              | Success                       |
//! |--------|-------------------|-------------------------------|
//! | GET    | `/secrets`        | 200 `{secrets: [...]}`        |
//! | GET    | `/secrets/{name}` | 200 `{secret_name, value}`    |
//! | POST   | `/secrets`        | 201 `{message}`               |
//! | DELETE | `/secrets/{name}` | 200 `{message}`               |
//! | GET    | `/health`         | 200 `{status: "ok"}`          |
//!
//! Failures are described in [`error`].
//!
//! Handlers share one `Arc<Vault>`. The vault has no per-request state, so
//! requests run fully concurrently.

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::vault::Vault;

/// Build the application router.
pub fn router(vault: Arc<Vault>) -> Router {
    Router::new()
        .route(
            "/secrets",
            get(handlers::list_secrets).post(handlers::store_secret),
        )
        .route(
            "/secrets/:name",
            get(handlers::get_secret).delete(handlers::delete_secret),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(vault)
}

/// Serve the router on `bind` until Ctrl-C.
pub async fn serve(vault: Arc<Vault>, bind: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {}", bind))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        container = vault.container(),
        "listening"
    );

    axum::serve(listener, router(vault))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
