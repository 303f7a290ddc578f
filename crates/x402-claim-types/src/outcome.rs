//! Terminal claim outcomes and the JSON bodies of the claim server.

use serde::{Deserialize, Serialize};

use crate::payment::ChallengeToken;

/// Result of one claim attempt. Produced exactly once per attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set only on the degraded outcome: the server challenged, nothing could pay,
    /// and the caller opted to acknowledge the challenge instead of failing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved_challenge: Option<ChallengeToken>,
}

impl ClaimOutcome {
    pub fn granted(reward: Option<String>) -> Self {
        Self {
            success: true,
            reward,
            error: None,
            unresolved_challenge: None,
        }
    }

    pub fn failed<S: Into<String>>(error: S) -> Self {
        Self {
            success: false,
            reward: None,
            error: Some(error.into()),
            unresolved_challenge: None,
        }
    }

    pub fn acknowledged(challenge: Option<ChallengeToken>) -> Self {
        Self {
            success: true,
            reward: None,
            error: None,
            unresolved_challenge: challenge,
        }
    }

    /// Whether this is the acknowledged-but-unpaid outcome rather than a real grant.
    pub fn is_degraded(&self) -> bool {
        self.success && self.reward.is_none() && self.unresolved_challenge.is_some()
    }
}

/// `200` body of a granted claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimGranted {
    pub success: bool,
    pub reward: String,
}

/// `402` body sent alongside the challenge header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequiredBody {
    pub error: String,
    pub message: String,
}

impl Default for PaymentRequiredBody {
    fn default() -> Self {
        Self {
            error: "Payment Required".to_string(),
            message: "X-PAYMENT header required to complete claim".to_string(),
        }
    }
}

/// Generic `{error}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub const INVALID_PROOF: &'static str = "Missing or invalid EZKL proof in body";

    pub fn invalid_proof() -> Self {
        Self {
            error: Self::INVALID_PROOF.to_string(),
        }
    }
}

/// `404` body for unmatched routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundBody {
    pub error: String,
    pub path: String,
}

/// `405` body for `GET /api/claim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodNotAllowedBody {
    pub error: String,
    #[serde(rename = "use")]
    pub use_method: String,
}

/// `GET /` discovery body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub ok: bool,
    pub message: String,
    pub claim: String,
}
