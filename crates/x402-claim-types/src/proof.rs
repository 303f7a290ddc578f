//! Attestation proofs and the claim request body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque evidence that an externally computed classification holds.
///
/// Only `verified`, `proofId` and `classification` are interpreted. Everything else the
/// prover produced is carried in [`AttestationProof::extra`] and forwarded untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationProof {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttestationProof {
    /// A proof that reports itself as verified.
    pub fn verified() -> Self {
        Self {
            verified: Some(true),
            ..Self::default()
        }
    }

    pub fn with_proof_id<S: Into<String>>(mut self, proof_id: S) -> Self {
        self.proof_id = Some(proof_id.into());
        self
    }

    pub fn with_classification<S: Into<String>>(mut self, classification: S) -> Self {
        self.classification = Some(classification.into());
        self
    }

    /// True only when the prover explicitly marked the proof as verified.
    pub fn is_verified(&self) -> bool {
        self.verified == Some(true)
    }
}

/// Body of `POST /api/claim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub proof: AttestationProof,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_resolved: Option<bool>,
}

impl ClaimRequest {
    /// Initial request of an attempt: the proof and nothing else.
    pub fn new(proof: AttestationProof) -> Self {
        Self {
            proof,
            payment_resolved: None,
        }
    }

    /// Marks the request as following a completed out-of-band transfer.
    pub fn resolved(self) -> Self {
        Self {
            payment_resolved: Some(true),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_proof_keeps_unknown_fields() {
        let value = json!({
            "verified": true,
            "proofId": "abc",
            "hrv": 42,
            "publicSignals": ["1", "2"]
        });
        let proof: AttestationProof = serde_json::from_value(value.clone()).unwrap();
        assert!(proof.is_verified());
        assert_eq!(proof.proof_id.as_deref(), Some("abc"));
        assert_eq!(proof.extra.get("hrv"), Some(&json!(42)));
        assert_eq!(serde_json::to_value(&proof).unwrap(), value);
    }

    #[test]
    fn test_unverified_proof() {
        let proof: AttestationProof = serde_json::from_value(json!({"verified": false})).unwrap();
        assert!(!proof.is_verified());
        assert!(!AttestationProof::default().is_verified());
    }

    #[test]
    fn test_claim_request_wire_shape() {
        let request = ClaimRequest::new(AttestationProof::verified());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"proof": {"verified": true}})
        );
        assert_eq!(
            serde_json::to_value(request.resolved()).unwrap(),
            json!({"proof": {"verified": true}, "paymentResolved": true})
        );
    }
}
