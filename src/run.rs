//! Claim server bootstrap.
//!
//! - Loads `.env` variables.
//! - Initializes logging, and OpenTelemetry export with the `telemetry` feature.
//! - Builds the claim endpoint from configuration.
//! - Serves HTTP until SIGINT or SIGTERM.

use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::{ChallengeConfig, Config};
use crate::util::{SigDown, Telemetry};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register()?;

    let config = Config::load()?;
    match config.challenge() {
        ChallengeConfig::Static { token } => tracing::warn!(
            token = %token,
            "Static challenge mode: claims are not tracked and may be granted repeatedly"
        ),
        ChallengeConfig::Ledger { ttl_secs } => {
            tracing::info!(ttl_secs, "Single-use challenge ledger enabled")
        }
    }
    let server = Arc::new(config.claim_server()?);
    tracing::info!(reward = %server.reward(), "Claim reward configured");

    let http_endpoints = crate::app(server);

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("Failed to bind to {}: {}", addr, e))?;

    let sig_down = SigDown::try_new()?;
    axum::serve(listener, http_endpoints)
        .with_graceful_shutdown(sig_down.graceful_shutdown())
        .await?;
    sig_down.recv().await;
    tracing::info!("Claim server stopped");

    Ok(())
}
