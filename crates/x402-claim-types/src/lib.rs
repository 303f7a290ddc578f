//! Wire types for the x402 reward claim protocol.
//!
//! A reward claim is gated twice: the claimant presents an attestation proof for some
//! externally computed classification, and then pays through an HTTP `402 Payment Required`
//! challenge. This crate holds the data that crosses the wire between the claim server
//! and the claim agent, so both sides agree on field names, header names and response shapes.
//!
//! # Modules
//!
//! - [`headers`]: Header names used for challenges and payment evidence.
//! - [`proof`]: [`AttestationProof`](proof::AttestationProof) and the [`ClaimRequest`](proof::ClaimRequest) body.
//! - [`payment`]: [`ChallengeToken`](payment::ChallengeToken) and [`PaymentCredential`](payment::PaymentCredential).
//! - [`outcome`]: Terminal [`ClaimOutcome`](outcome::ClaimOutcome) and the server response bodies.
//! - [`money_amount`]: Decimal reward amounts and the [`Reward`](money_amount::Reward) label.

pub mod headers;
pub mod money_amount;
pub mod outcome;
pub mod payment;
pub mod proof;

pub use money_amount::{MoneyAmount, MoneyAmountParseError, Reward};
pub use outcome::*;
pub use payment::{ChallengeToken, PaymentCredential};
pub use proof::{AttestationProof, ClaimRequest};
