//! Challenge tokens and the payment credentials that answer them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;

use crate::headers;

/// What must be paid or signed before a claim is granted.
///
/// Issued by the claim server in the [`headers::PAYMENT_REQUEST`] header of a 402 response.
/// The token is opaque to the agent; it is only ever handed to a signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeToken(String);

impl ChallengeToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ChallengeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChallengeToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ChallengeToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Evidence that a challenge was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentCredential {
    /// A credential produced by signing the challenge. Sent as `X-PAYMENT`.
    Signed(String),
    /// Payment was settled by an out-of-band transfer. Sent as `X-Payment-Resolved`.
    Resolved,
}

impl PaymentCredential {
    /// Header this credential travels in.
    pub fn header_name(&self) -> &'static str {
        match self {
            PaymentCredential::Signed(_) => headers::X_PAYMENT,
            PaymentCredential::Resolved => headers::X_PAYMENT_RESOLVED,
        }
    }

    /// Header value put on the wire.
    pub fn header_value(&self) -> &str {
        match self {
            PaymentCredential::Signed(signature) => signature,
            PaymentCredential::Resolved => headers::RESOLVED_MARKER,
        }
    }
}
