//! Payment evidence detector.
//!
//! Only presence is checked. Validating a signed credential belongs to whatever real
//! payment backend sits behind this server.

use axum::http::HeaderMap;
use x402_claim_types::headers::{X_PAYMENT, X_PAYMENT_RESOLVED};

/// Returns `true` iff `X-PAYMENT` or `X-Payment-Resolved` is present with a non-empty value.
pub fn has_payment_evidence(headers: &HeaderMap) -> bool {
    [X_PAYMENT, X_PAYMENT_RESOLVED].iter().any(|name| {
        headers
            .get_all(*name)
            .iter()
            .any(|value| !value.as_bytes().is_empty())
    })
}
