//! Reward claim server gated by an attestation proof and an HTTP 402 payment challenge.
//!
//! A claim is granted only when the request carries (a) a proof for some externally
//! computed classification and (b) evidence that the payment challenge was answered.
//! The challenge/response pattern follows [x402](https://www.x402.org): a valid proof without
//! payment evidence is answered with `402 Payment Required` and a challenge token in the
//! `x402-payment-request` header; the client resolves it and retries once.
//!
//! # Modules
//!
//! - [`attestation`]: Proof shape validator.
//! - [`payment`]: Payment evidence detector.
//! - [`challenge`]: Challenge issuing, static or ledger-backed.
//! - [`handlers`]: HTTP endpoints and the three-way claim decision.
//! - [`config`]: Server configuration from CLI, JSON file and environment.
//! - [`run`]: Server bootstrap.
//! - [`util`]: Telemetry and graceful shutdown.
//!
//! # Limitations
//!
//! In the default static challenge mode the server keeps no claim history: nothing prevents
//! the same proof from being granted any number of times, and the challenge is not bound to
//! the proof. See [`challenge::ChallengeLedger`] for the opt-in single-use mode.

pub mod attestation;
pub mod challenge;
pub mod config;
pub mod handlers;
pub mod payment;
pub mod run;
pub mod util;

use axum::Router;
use axum::http::Method;
use axum::middleware;
use std::sync::Arc;
use tower_http::cors;

pub use handlers::{ClaimDecision, ClaimServer};
pub use run::run;

/// Builds the full HTTP application: claim routes, CORS and request tracing.
pub fn app(server: Arc<ClaimServer>) -> Router {
    Router::new()
        .merge(handlers::routes().with_state(server.clone()))
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(cors::Any),
        )
        .layer(middleware::from_fn_with_state(
            server,
            handlers::claim_preflight,
        ))
        .layer(util::Telemetry::http_tracing())
}
