//! Challenge issuing for `402 Payment Required` responses.
//!
//! Two modes are available:
//!
//! - [`ChallengeIssuer::Static`] always hands out the same configured token and keeps no state.
//!   Any request carrying payment evidence is granted, so the same proof can be claimed
//!   any number of times. This is the default and matches the reference deployment.
//! - [`ChallengeIssuer::Ledger`] issues a random single-use token per challenge and records
//!   it against the proof identity for a bounded time. A paid request is granted only if an
//!   unexpired challenge is outstanding for its proof, and granting consumes it. Otherwise the
//!   caller is challenged again. The payment credential content is still not inspected.

use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};
use x402_claim_types::ChallengeToken;

/// Token issued in static mode unless configured otherwise.
pub const DEFAULT_CHALLENGE_TOKEN: &str = "monad-testnet-0x123";

#[derive(Debug)]
pub enum ChallengeIssuer {
    Static(ChallengeToken),
    Ledger(ChallengeLedger),
}

impl Default for ChallengeIssuer {
    fn default() -> Self {
        ChallengeIssuer::Static(ChallengeToken::new(DEFAULT_CHALLENGE_TOKEN))
    }
}

impl ChallengeIssuer {
    /// Issues a challenge for the proof carried in `body`.
    pub fn issue(&self, body: &Value) -> ChallengeToken {
        match self {
            ChallengeIssuer::Static(token) => token.clone(),
            ChallengeIssuer::Ledger(ledger) => ledger.issue(&proof_identity(body)),
        }
    }

    /// Returns `true` if a paid request for the proof in `body` may be granted.
    pub fn redeem(&self, body: &Value) -> bool {
        match self {
            ChallengeIssuer::Static(_) => true,
            ChallengeIssuer::Ledger(ledger) => ledger.redeem(&proof_identity(body)),
        }
    }
}

/// Time-bounded, single-use challenges keyed by proof identity.
///
/// At most one challenge is outstanding per proof: issuing again replaces the previous one.
#[derive(Debug)]
pub struct ChallengeLedger {
    ttl: Duration,
    outstanding: DashMap<String, (ChallengeToken, Instant)>,
}

impl ChallengeLedger {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            outstanding: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of challenges currently recorded, expired ones included until the next issue.
    pub fn len(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }

    pub fn issue(&self, identity: &str) -> ChallengeToken {
        let now = Instant::now();
        self.outstanding
            .retain(|_, (_, expires_at)| *expires_at > now);
        let nonce: [u8; 16] = rand::random();
        let token = ChallengeToken::new(format!("x402-claim-{}", hex::encode(nonce)));
        self.outstanding
            .insert(identity.to_string(), (token.clone(), now + self.ttl));
        tracing::debug!(identity, token = %token, "Recorded claim challenge");
        token
    }

    pub fn redeem(&self, identity: &str) -> bool {
        match self.outstanding.remove(identity) {
            Some((_, (token, expires_at))) if expires_at > Instant::now() => {
                tracing::debug!(identity, token = %token, "Consumed claim challenge");
                true
            }
            Some(_) => {
                tracing::debug!(identity, "Claim challenge expired");
                false
            }
            None => false,
        }
    }
}

/// Identity of the proof in a claim body: `proofId`, else `classification`,
/// else the canonical JSON of the whole proof.
pub fn proof_identity(body: &Value) -> String {
    let proof = body.get("proof").unwrap_or(&Value::Null);
    let field = |name: &str| {
        proof
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    field("proofId")
        .map(|id| format!("proofId:{id}"))
        .or_else(|| field("classification").map(|c| format!("classification:{c}")))
        .unwrap_or_else(|| format!("proof:{proof}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_issuer_is_stateless() {
        let issuer = ChallengeIssuer::default();
        let body = json!({"proof": {"verified": true}});
        assert_eq!(issuer.issue(&body).as_str(), DEFAULT_CHALLENGE_TOKEN);
        assert_eq!(issuer.issue(&body).as_str(), DEFAULT_CHALLENGE_TOKEN);
        assert!(issuer.redeem(&body));
        assert!(issuer.redeem(&body));
    }

    #[test]
    fn test_ledger_challenge_is_single_use() {
        let issuer = ChallengeIssuer::Ledger(ChallengeLedger::new(Duration::from_secs(60)));
        let body = json!({"proof": {"proofId": "abc"}});

        assert!(!issuer.redeem(&body));
        let first = issuer.issue(&body);
        assert!(first.as_str().starts_with("x402-claim-"));
        assert!(issuer.redeem(&body));
        assert!(!issuer.redeem(&body));
    }

    #[test]
    fn test_ledger_tokens_are_fresh_and_per_proof() {
        let ledger = ChallengeLedger::new(Duration::from_secs(60));
        let a = ledger.issue("proofId:a");
        let b = ledger.issue("proofId:b");
        assert_ne!(a, b);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.redeem("proofId:a"));
        assert!(!ledger.redeem("proofId:a"));
        assert!(ledger.redeem("proofId:b"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_ledger_challenge_expires() {
        let ledger = ChallengeLedger::new(Duration::ZERO);
        ledger.issue("proofId:a");
        assert!(!ledger.redeem("proofId:a"));
    }

    #[test]
    fn test_proof_identity() {
        assert_eq!(
            proof_identity(&json!({"proof": {"proofId": "abc", "classification": "x"}})),
            "proofId:abc"
        );
        assert_eq!(
            proof_identity(&json!({"proof": {"proofId": "", "classification": "calm"}})),
            "classification:calm"
        );
        assert_eq!(
            proof_identity(&json!({"proof": {"verified": true}})),
            r#"proof:{"verified":true}"#
        );
    }
}
