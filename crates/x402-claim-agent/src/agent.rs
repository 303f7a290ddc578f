//! The claim attempt state machine.
//!
//! One attempt moves through these states:
//!
//! ```text
//! Requesting ──200──────────────────────────────────────────────▶ Succeeded
//!     │ ──other status / transport error──────────────────────────▶ Failed
//!     └─402─▶ ChallengeReceived ──signed or transferred─▶ Retrying ──200──▶ Succeeded
//!                  │                                        └─anything else─▶ Failed
//!                  ├─resolution error / no capability────────────────────────▶ Failed
//!                  └─no capability, acknowledging─────────────────────────────▶ Acknowledged
//! ```
//!
//! `Retrying` is entered at most once and always ends the attempt, so no attempt sends
//! more than two requests.

use http::StatusCode;
use http::header::HeaderValue;
use reqwest::Client;
use std::time::Duration;
use url::Url;
use x402_claim_types::{
    AttestationProof, ChallengeToken, ClaimGranted, ClaimOutcome, ClaimRequest,
    PaymentCredential, headers,
};

use crate::error::{ClaimError, ResolutionError};
use crate::resolver::{PaymentResolver, UnresolvedChallengePolicy};
use crate::trace::{NegotiationTrace, TraceSink};

/// Claim endpoint used when none is configured.
pub const DEFAULT_CLAIM_URL: &str = "http://127.0.0.1:5000/api/claim";

/// Outcome of one attempt together with its narrative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReport {
    pub outcome: ClaimOutcome,
    pub trace: Vec<String>,
}

/// Drives claim attempts against one claim endpoint.
#[derive(Clone, Debug)]
pub struct ClaimAgent {
    claim_url: Url,
    client: Client,
    timeout: Option<Duration>,
    policy: UnresolvedChallengePolicy,
}

#[derive(Debug)]
enum AttemptState {
    Requesting,
    ChallengeReceived(Option<ChallengeToken>),
    Retrying {
        request: ClaimRequest,
        credential: PaymentCredential,
    },
    Succeeded(Option<String>),
    Acknowledged(Option<ChallengeToken>),
    Failed(ClaimError),
}

enum ServerReply {
    Granted { reward: Option<String> },
    Challenged {
        challenge: Option<ChallengeToken>,
        body: String,
    },
}

impl ClaimAgent {
    pub fn try_new(claim_url: Url) -> Result<Self, ClaimError> {
        Ok(Self {
            claim_url,
            client: Client::new(),
            timeout: None,
            policy: UnresolvedChallengePolicy::default(),
        })
    }

    pub fn claim_url(&self) -> &Url {
        &self.claim_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn policy(&self) -> UnresolvedChallengePolicy {
        self.policy
    }

    /// Bounds each whole attempt, both requests and the resolution step included.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut this = self.clone();
        this.timeout = Some(timeout);
        this
    }

    pub fn with_policy(&self, policy: UnresolvedChallengePolicy) -> Self {
        let mut this = self.clone();
        this.policy = policy;
        this
    }

    /// Runs one claim attempt for `proof`.
    ///
    /// Every narrative line is handed to `sink` as it is produced and also returned in the
    /// report. Never fails: all errors end up in [`ClaimOutcome::error`].
    pub async fn claim(
        &self,
        proof: &AttestationProof,
        resolver: &PaymentResolver,
        sink: &dyn TraceSink,
    ) -> ClaimReport {
        let mut trace = NegotiationTrace::new(sink);
        let outcome = match self.timeout {
            None => self.negotiate(proof, resolver, &mut trace).await,
            Some(timeout) => {
                let attempt = self.negotiate(proof, resolver, &mut trace);
                let result = tokio::time::timeout(timeout, attempt).await;
                match result {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        let err = ClaimError::TimedOut(timeout);
                        trace.log(failure_line(&err));
                        ClaimOutcome::failed(err.outcome_message())
                    }
                }
            }
        };
        ClaimReport {
            outcome,
            trace: trace.into_lines(),
        }
    }

    async fn negotiate(
        &self,
        proof: &AttestationProof,
        resolver: &PaymentResolver,
        trace: &mut NegotiationTrace<'_>,
    ) -> ClaimOutcome {
        if !proof.is_verified() {
            return ClaimOutcome::failed(ClaimError::InvalidProofResult.outcome_message());
        }
        trace.log("EZKL Proof detected. Initializing X402 handshake...");

        let initial = ClaimRequest::new(proof.clone());
        let mut state = AttemptState::Requesting;
        loop {
            state = match state {
                AttemptState::Requesting => {
                    match self.submit(&initial, None, "POST /api/claim").await {
                        Ok(ServerReply::Granted { reward }) => AttemptState::Succeeded(reward),
                        Ok(ServerReply::Challenged { challenge, .. }) => {
                            tracing::debug!(challenge = ?challenge, "Claim challenged");
                            AttemptState::ChallengeReceived(challenge)
                        }
                        Err(err) => AttemptState::Failed(err),
                    }
                }
                AttemptState::ChallengeReceived(challenge) => {
                    self.resolve(challenge, resolver, &initial, trace).await
                }
                AttemptState::Retrying {
                    request,
                    credential,
                } => {
                    let reply = self
                        .submit(&request, Some(&credential), "POST /api/claim (paid)")
                        .await;
                    match reply {
                        Ok(ServerReply::Granted { reward }) => AttemptState::Succeeded(reward),
                        Ok(ServerReply::Challenged { body, .. }) => {
                            AttemptState::Failed(ClaimError::UnexpectedStatus {
                                status: StatusCode::PAYMENT_REQUIRED,
                                body,
                            })
                        }
                        Err(err) => AttemptState::Failed(err),
                    }
                }
                AttemptState::Succeeded(reward) => {
                    trace.log("200 Success. Shielded payout confirmed on Monad.");
                    return ClaimOutcome::granted(reward);
                }
                AttemptState::Acknowledged(challenge) => {
                    return ClaimOutcome::acknowledged(challenge);
                }
                AttemptState::Failed(err) => {
                    trace.log(failure_line(&err));
                    return ClaimOutcome::failed(err.outcome_message());
                }
            };
        }
    }

    /// Picks a way to answer the challenge: a signer if one is available and the server
    /// named a challenge, else a targeted transfer, else the unresolved policy.
    async fn resolve(
        &self,
        challenge: Option<ChallengeToken>,
        resolver: &PaymentResolver,
        initial: &ClaimRequest,
        trace: &mut NegotiationTrace<'_>,
    ) -> AttemptState {
        if let (Some(signer), Some(token)) = (resolver.signer(), challenge.as_ref()) {
            trace.log("402 Challenge Received. Agent signing payment...");
            let credential = match signer.sign(token).await {
                Ok(credential) => credential,
                Err(err) => return AttemptState::Failed(err.into()),
            };
            if credential.is_empty() || HeaderValue::from_str(&credential).is_err() {
                return AttemptState::Failed(
                    ResolutionError::Signer(
                        "Signer produced a credential that cannot be sent as a header".into(),
                    )
                    .into(),
                );
            }
            trace.log("402 Challenge resolved. Retrying with payment header...");
            return AttemptState::Retrying {
                request: initial.clone(),
                credential: PaymentCredential::Signed(credential),
            };
        }

        if let Some(transfer) = resolver.usable_transfer() {
            trace.log("402 Challenge Received. Agent sending shielded transfer...");
            let receipt = transfer.transfer().await;
            if !receipt.success {
                let reason = receipt
                    .error
                    .unwrap_or_else(|| "Shielded transfer failed".to_string());
                trace.log(format!("Shielded transfer failed: {reason}"));
                return AttemptState::Failed(ResolutionError::Transfer(reason).into());
            }
            trace.log("402 Challenge resolved. Retrying with payment header...");
            return AttemptState::Retrying {
                request: initial.clone().resolved(),
                credential: PaymentCredential::Resolved,
            };
        }

        match self.policy {
            UnresolvedChallengePolicy::Fail => {
                trace.log("402 Challenge Received. No signer or transfer available.");
                AttemptState::Failed(ClaimError::UnresolvedChallenge)
            }
            UnresolvedChallengePolicy::Acknowledge => {
                trace.log("402 Challenge acknowledged without payment. Not retrying.");
                AttemptState::Acknowledged(challenge)
            }
        }
    }

    /// Sends one claim request and classifies the reply.
    ///
    /// `200` and `402` are replies the state machine handles; any other status is an error
    /// carrying the response body.
    async fn submit(
        &self,
        request: &ClaimRequest,
        credential: Option<&PaymentCredential>,
        context: &'static str,
    ) -> Result<ServerReply, ClaimError> {
        let mut req = self.client.post(self.claim_url.clone()).json(request);
        if let Some(credential) = credential {
            req = req.header(credential.header_name(), credential.header_value());
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| ClaimError::Transport { context, source: e })?;

        let status = http_response.status();
        let challenge = http_response
            .headers()
            .get(headers::PAYMENT_REQUEST)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(ChallengeToken::new);
        let body = http_response
            .text()
            .await
            .map_err(|e| ClaimError::ResponseBodyRead { context, source: e })?;

        match status {
            StatusCode::OK => {
                let reward = serde_json::from_str::<ClaimGranted>(&body)
                    .ok()
                    .map(|granted| granted.reward);
                Ok(ServerReply::Granted { reward })
            }
            StatusCode::PAYMENT_REQUIRED => Ok(ServerReply::Challenged { challenge, body }),
            status => Err(ClaimError::UnexpectedStatus { status, body }),
        }
    }
}

impl TryFrom<&str> for ClaimAgent {
    type Error = ClaimError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let url = Url::parse(value).map_err(|e| ClaimError::UrlParse {
            context: "Failed to parse claim URL",
            source: e,
        })?;
        ClaimAgent::try_new(url)
    }
}

impl TryFrom<String> for ClaimAgent {
    type Error = ClaimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ClaimAgent::try_from(value.as_str())
    }
}

fn failure_line(err: &ClaimError) -> String {
    match err {
        ClaimError::UnexpectedStatus { status, body } => {
            format!("Claim failed: {} {body}", status.as_u16())
        }
        err if err.is_connectivity() => {
            "Connection failed. Is the claim server running? Start it with: x402-claim".to_string()
        }
        ClaimError::Transport { .. } | ClaimError::ResponseBodyRead { .. } => {
            format!("Error: {}", err.outcome_message())
        }
        err => format!("Claim failed: {}", err.outcome_message()),
    }
}
