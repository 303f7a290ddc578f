//! Capabilities the agent may use to answer a payment challenge.

use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::sync::Arc;
use x402_claim_types::ChallengeToken;

use crate::error::ResolutionError;

/// Turns a challenge token into a credential the server accepts in `X-PAYMENT`.
#[async_trait]
pub trait PaymentSigner: Send + Sync {
    async fn sign(&self, challenge: &ChallengeToken) -> Result<String, ResolutionError>;
}

/// Settles payment out of band, with no challenge signing.
#[async_trait]
pub trait FundsTransfer: Send + Sync {
    /// Whether a recipient and a way to send are both available.
    fn has_target(&self) -> bool;

    async fn transfer(&self) -> TransferReceipt;
}

/// Result of a [`FundsTransfer`]. `error` is set when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub success: bool,
    pub error: Option<String>,
}

impl TransferReceipt {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed<S: Into<String>>(error: S) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Signer that always presents the same preconfigured credential.
#[derive(Debug, Clone)]
pub struct StaticSigner {
    credential: String,
}

impl StaticSigner {
    pub fn new<S: Into<String>>(credential: S) -> Self {
        Self {
            credential: credential.into(),
        }
    }
}

#[async_trait]
impl PaymentSigner for StaticSigner {
    async fn sign(&self, _challenge: &ChallengeToken) -> Result<String, ResolutionError> {
        Ok(self.credential.clone())
    }
}

/// What to do when challenged with neither a signer nor a usable transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnresolvedChallengePolicy {
    /// End the attempt as failed.
    #[default]
    Fail,
    /// End the attempt as a degraded success carrying the challenge, with no retry.
    Acknowledge,
}

/// The capabilities available to one claim attempt. Both are optional.
#[derive(Clone, Default)]
pub struct PaymentResolver {
    signer: Option<Arc<dyn PaymentSigner>>,
    transfer: Option<Arc<dyn FundsTransfer>>,
}

impl Debug for PaymentResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentResolver")
            .field("signer", &self.signer.is_some())
            .field("transfer", &self.transfer.is_some())
            .finish()
    }
}

impl PaymentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signer<S: PaymentSigner + 'static>(self, signer: S) -> Self {
        self.with_shared_signer(Arc::new(signer))
    }

    pub fn with_shared_signer(mut self, signer: Arc<dyn PaymentSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_transfer<T: FundsTransfer + 'static>(self, transfer: T) -> Self {
        self.with_shared_transfer(Arc::new(transfer))
    }

    pub fn with_shared_transfer(mut self, transfer: Arc<dyn FundsTransfer>) -> Self {
        self.transfer = Some(transfer);
        self
    }

    pub fn signer(&self) -> Option<&dyn PaymentSigner> {
        self.signer.as_deref()
    }

    /// The transfer capability, only if it currently has a target.
    pub fn usable_transfer(&self) -> Option<&dyn FundsTransfer> {
        self.transfer.as_deref().filter(|t| t.has_target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Untargeted;

    #[async_trait]
    impl FundsTransfer for Untargeted {
        fn has_target(&self) -> bool {
            false
        }

        async fn transfer(&self) -> TransferReceipt {
            TransferReceipt::ok()
        }
    }

    #[tokio::test]
    async fn test_static_signer_ignores_challenge() {
        let signer = StaticSigner::new("cred");
        let credential = signer.sign(&ChallengeToken::new("anything")).await;
        assert_eq!(credential, Ok("cred".to_string()));
    }

    #[test]
    fn test_transfer_without_target_is_not_usable() {
        let resolver = PaymentResolver::new().with_transfer(Untargeted);
        assert!(resolver.usable_transfer().is_none());
        assert!(resolver.signer().is_none());
        assert_eq!(
            format!("{resolver:?}"),
            "PaymentResolver { signer: false, transfer: true }"
        );
    }
}
