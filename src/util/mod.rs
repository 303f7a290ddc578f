//! Utilities for the claim server.
//!
//! - [`sig_down`] - Graceful shutdown signal handling
//! - [`telemetry`] - Log subscriber and optional OpenTelemetry export

pub mod sig_down;
pub mod telemetry;

pub use sig_down::*;
pub use telemetry::*;
