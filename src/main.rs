//! x402 claim server entrypoint.
//!
//! Endpoints:
//! - `GET /` – Discovery document
//! - `GET /api/claim` – `405 Method Not Allowed`
//! - `OPTIONS /api/claim` – CORS preflight
//! - `POST /api/claim` – Submit a proof, receive a `402` challenge or the reward
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control binding address
//! - `CONFIG` points at an optional JSON configuration file
//! - `RUST_LOG` controls log verbosity
//! - `OTEL_*` variables enable export with the `telemetry` feature

use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = x402_claim::run().await {
        eprintln!("{e}");
        process::exit(1)
    }
}
