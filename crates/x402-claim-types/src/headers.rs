//! HTTP header names of the claim protocol.
//!
//! Names are matched case-insensitively by HTTP stacks; the casing here is the
//! one put on the wire.

/// Response header carrying the [`ChallengeToken`](crate::ChallengeToken) on a 402.
pub const PAYMENT_REQUEST: &str = "x402-payment-request";

/// Request header carrying a signed payment credential.
pub const X_PAYMENT: &str = "X-PAYMENT";

/// Request header carrying the out-of-band resolution marker.
pub const X_PAYMENT_RESOLVED: &str = "X-Payment-Resolved";

/// Marker value sent in [`X_PAYMENT_RESOLVED`] after a completed shielded transfer.
pub const RESOLVED_MARKER: &str = "shielded";
