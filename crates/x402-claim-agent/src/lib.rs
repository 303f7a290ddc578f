#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client agent for x402 reward claims.
//!
//! The [`ClaimAgent`] runs one claim attempt end to end: it submits the attestation proof,
//! and when the server answers `402 Payment Required` it resolves the challenge through the
//! injected [`PaymentResolver`] and retries exactly once with the payment evidence attached.
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use x402_claim_agent::{ClaimAgent, PaymentResolver, StaticSigner};
//! use x402_claim_types::AttestationProof;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let agent = ClaimAgent::try_from("http://127.0.0.1:5000/api/claim")?;
//! let resolver = PaymentResolver::new().with_signer(StaticSigner::new("signed-credential"));
//! let proof = AttestationProof::verified().with_proof_id("abc");
//!
//! let report = agent
//!     .claim(&proof, &resolver, &|line: &str| println!("{line}"))
//!     .await;
//! assert!(report.outcome.success);
//! # Ok(())
//! # }
//! ```
//!
//! ## Resolving challenges
//!
//! - **Signer** ([`PaymentSigner`]): turns the challenge token into a credential sent as `X-PAYMENT`.
//! - **Transfer** ([`FundsTransfer`]): moves funds out of band; the retry then carries
//!   `X-Payment-Resolved: shielded` and `paymentResolved: true`. See [`ShieldedTransfer`].
//!
//! With neither available, the [`UnresolvedChallengePolicy`] decides between failing
//! (the default) and an explicitly degraded acknowledged outcome.

mod agent;
mod error;
mod resolver;
mod trace;
mod transfer;

pub use agent::*;
pub use error::*;
pub use resolver::*;
pub use trace::*;
pub use transfer::*;
