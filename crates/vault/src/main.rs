//! `persona-vault`: vault service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing, optional OTLP export).
//! 3. Build the [`FieldCipher`] from the configured key material.
//! 4. Initialise the account store.
//! 5. Build the Axum router and start the HTTP server.

mod config;
mod crypto;
mod managers;
mod model;
mod picture;
mod precondition;
mod server;
mod store;
mod telemetry;
mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use crypto::FieldCipher;
use picture::PortraitProcessor;
use server::state::AppState;
use store::InMemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        nonce_mode = %cfg.nonce_mode,
        "persona-vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Field cipher
    // -----------------------------------------------------------------------
    let cipher: Arc<FieldCipher> = Arc::new(cfg.build_cipher()?);

    // -----------------------------------------------------------------------
    // 4. Account store
    // -----------------------------------------------------------------------
    let store = Arc::new(InMemoryStore::new());

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(store, cipher, Arc::new(PortraitProcessor));
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
