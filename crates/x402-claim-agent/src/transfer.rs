//! Shielded reward transfer used when no signer is available.
//!
//! A [`ShieldedTransfer`] sends a fixed reward amount from the connected wallet to the
//! recipient's shielded address through a [`TransferBackend`]. The backend is the wallet
//! SDK's send function; it is injected so the agent never depends on a particular wallet.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{self, Debug};
use std::sync::Arc;
use x402_claim_types::MoneyAmount;

use crate::resolver::{FundsTransfer, TransferReceipt};

/// Token address used when none is configured.
pub const DEFAULT_TOKEN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
/// Decimal places of the reward token.
pub const REWARD_DECIMALS: u32 = 18;

/// One send of `amount` base units of `token` to `recipient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInstruction {
    pub token: String,
    pub recipient: String,
    pub amount: u128,
}

/// Executes shielded sends.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    async fn send(
        &self,
        instructions: Vec<TransferInstruction>,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

#[derive(Clone)]
pub struct ShieldedTransfer {
    backend: Option<Arc<dyn TransferBackend>>,
    recipient: Option<String>,
    token: String,
    amount: MoneyAmount,
}

impl Debug for ShieldedTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShieldedTransfer")
            .field("backend", &self.backend.is_some())
            .field("recipient", &self.recipient)
            .field("token", &self.token)
            .field("amount", &self.amount)
            .finish()
    }
}

impl Default for ShieldedTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl ShieldedTransfer {
    /// A transfer of `1.0` token with no backend and no recipient.
    /// It has no target until both are set.
    pub fn new() -> Self {
        Self {
            backend: None,
            recipient: None,
            token: DEFAULT_TOKEN_ADDRESS.to_string(),
            amount: MoneyAmount::one(),
        }
    }

    pub fn with_backend<B: TransferBackend + 'static>(mut self, backend: B) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    pub fn with_recipient<S: Into<String>>(mut self, recipient: S) -> Self {
        self.recipient = Some(recipient.into()).filter(|r: &String| !r.is_empty());
        self
    }

    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_amount(mut self, amount: MoneyAmount) -> Self {
        self.amount = amount;
        self
    }

    fn instruction(&self, recipient: &str) -> Result<TransferInstruction, String> {
        let amount = self
            .amount
            .as_base_units(REWARD_DECIMALS)
            .map_err(|e| e.to_string())?;
        Ok(TransferInstruction {
            token: self.token.clone(),
            recipient: recipient.to_string(),
            amount,
        })
    }
}

#[async_trait]
impl FundsTransfer for ShieldedTransfer {
    fn has_target(&self) -> bool {
        self.backend.is_some() && self.recipient.is_some()
    }

    async fn transfer(&self) -> TransferReceipt {
        let Some(backend) = self.backend.as_ref() else {
            return TransferReceipt::failed("Unlink send not available.");
        };
        let Some(recipient) = self.recipient.as_deref() else {
            return TransferReceipt::failed("No wallet connected.");
        };
        let instruction = match self.instruction(recipient) {
            Ok(instruction) => instruction,
            Err(reason) => return TransferReceipt::failed(reason),
        };
        match backend.send(vec![instruction]).await {
            Ok(()) => TransferReceipt::ok(),
            Err(err) => {
                let message = err.to_string();
                tracing::error!(error = %message, "Shielded send failed");
                TransferReceipt::failed(message)
            }
        }
    }
}
