use http::StatusCode;

/// A signer or transfer capability failed. Carries the underlying reason verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("{0}")]
    Signer(String),
    #[error("{0}")]
    Transfer(String),
}

/// Why a claim attempt ended in failure.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    /// The caller's proof result was not marked verified. No request was sent.
    #[error("Invalid proof result")]
    InvalidProofResult,
    /// The claim server could not be reached, or the exchange broke off.
    #[error("HTTP error: {context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with anything but the expected status.
    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// The attempt did not reach a terminal state in time.
    #[error("Claim attempt timed out after {0:?}")]
    TimedOut(std::time::Duration),
    /// Challenged, with no signer and no usable transfer, under the failing policy.
    #[error("Payment challenge could not be resolved: no signer or transfer capability")]
    UnresolvedChallenge,
}

impl ClaimError {
    /// Connectivity failures, as opposed to the server rejecting the claim.
    pub fn is_connectivity(&self) -> bool {
        match self {
            ClaimError::Transport { source, .. } => source.is_connect() || source.is_timeout(),
            _ => false,
        }
    }

    /// The string reported in [`ClaimOutcome::error`](x402_claim_types::ClaimOutcome::error).
    ///
    /// Server rejections surface their body verbatim, or `HTTP <status>` when it is empty.
    pub fn outcome_message(&self) -> String {
        match self {
            ClaimError::UnexpectedStatus { status, body } if body.is_empty() => {
                format!("HTTP {}", status.as_u16())
            }
            ClaimError::UnexpectedStatus { body, .. } => body.clone(),
            ClaimError::Transport { source, .. } | ClaimError::ResponseBodyRead { source, .. } => {
                source.to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message() {
        let rejected = ClaimError::UnexpectedStatus {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error":"Missing or invalid EZKL proof in body"}"#.to_string(),
        };
        assert_eq!(
            rejected.outcome_message(),
            r#"{"error":"Missing or invalid EZKL proof in body"}"#
        );
        let empty = ClaimError::UnexpectedStatus {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert_eq!(empty.outcome_message(), "HTTP 502");
        assert!(!empty.is_connectivity());
    }

    #[test]
    fn test_resolution_reason_is_verbatim() {
        let error: ClaimError = ResolutionError::Signer("wallet locked".to_string()).into();
        assert_eq!(error.outcome_message(), "wallet locked");
        assert_eq!(
            ClaimError::InvalidProofResult.outcome_message(),
            "Invalid proof result"
        );
    }
}
