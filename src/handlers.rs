//! HTTP endpoints of the claim server.
//!
//! - `GET /` – Discovery document
//! - `GET /api/claim` – `405`, the endpoint only accepts `POST`
//! - `OPTIONS /api/claim` – CORS preflight
//! - `POST /api/claim` – Grant, challenge, or reject a reward claim
//!
//! `/api/claim/` with a trailing slash is served identically. Anything else is a JSON `404`.

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;
use x402_claim_types::headers::{PAYMENT_REQUEST, X_PAYMENT, X_PAYMENT_RESOLVED};
use x402_claim_types::{
    ChallengeToken, ClaimGranted, Discovery, ErrorBody, MethodNotAllowedBody, NotFoundBody,
    PaymentRequiredBody, Reward,
};

use crate::attestation::is_valid_attestation;
use crate::challenge::ChallengeIssuer;
use crate::payment::has_payment_evidence;

pub const CLAIM_PATH: &str = "/api/claim";
pub const CLAIM_PATH_SLASH: &str = "/api/claim/";

/// Origin echoed on preflight when the request carries none.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

const PREFLIGHT_ALLOW_METHODS: &str = "POST, OPTIONS";
const PREFLIGHT_ALLOW_HEADERS: &str = "Content-Type, X-PAYMENT, X-Payment-Resolved";

/// Shared state of the claim endpoint.
///
/// Holds configuration only, unless the challenge issuer runs in ledger mode.
#[derive(Debug)]
pub struct ClaimServer {
    challenges: ChallengeIssuer,
    reward: Reward,
    cors_fallback_origin: HeaderValue,
}

impl Default for ClaimServer {
    fn default() -> Self {
        Self::new(ChallengeIssuer::default(), Reward::default())
    }
}

/// Three-way decision on a claim attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimDecision {
    /// Missing or malformed proof.
    Reject,
    /// Valid proof, payment still owed.
    Challenge(ChallengeToken),
    /// Valid proof, payment evidence present.
    Grant(String),
}

impl ClaimServer {
    pub fn new(challenges: ChallengeIssuer, reward: Reward) -> Self {
        Self {
            challenges,
            reward,
            cors_fallback_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
        }
    }

    pub fn with_cors_fallback_origin(mut self, origin: HeaderValue) -> Self {
        self.cors_fallback_origin = origin;
        self
    }

    pub fn reward(&self) -> &Reward {
        &self.reward
    }

    pub fn challenges(&self) -> &ChallengeIssuer {
        &self.challenges
    }

    /// Decides a claim. The proof check runs first, so payment evidence never
    /// bypasses an invalid proof.
    pub fn decide(&self, body: &Value, headers: &HeaderMap) -> ClaimDecision {
        if !is_valid_attestation(body) {
            return ClaimDecision::Reject;
        }
        if !has_payment_evidence(headers) || !self.challenges.redeem(body) {
            return ClaimDecision::Challenge(self.challenges.issue(body));
        }
        ClaimDecision::Grant(self.reward.to_string())
    }
}

impl IntoResponse for ClaimDecision {
    fn into_response(self) -> Response {
        match self {
            ClaimDecision::Reject => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody::invalid_proof())).into_response()
            }
            ClaimDecision::Challenge(token) => {
                let mut response =
                    (StatusCode::PAYMENT_REQUIRED, Json(PaymentRequiredBody::default()))
                        .into_response();
                match HeaderValue::from_str(token.as_str()) {
                    Ok(value) => {
                        response.headers_mut().insert(PAYMENT_REQUEST, value);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Challenge token is not a valid header value");
                    }
                }
                response
            }
            ClaimDecision::Grant(reward) => (
                StatusCode::OK,
                Json(ClaimGranted {
                    success: true,
                    reward,
                }),
            )
                .into_response(),
        }
    }
}

pub fn routes() -> Router<Arc<ClaimServer>> {
    Router::new()
        .route("/", get(get_root))
        .route(CLAIM_PATH, get(get_claim).post(post_claim).options(options_claim))
        .route(
            CLAIM_PATH_SLASH,
            get(get_claim).post(post_claim).options(options_claim),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
}

/// `GET /`: Discovery document pointing at the claim endpoint.
#[instrument(skip_all)]
pub async fn get_root() -> impl IntoResponse {
    Json(Discovery {
        ok: true,
        message: "X402 claim API".to_string(),
        claim: format!("POST {CLAIM_PATH}"),
    })
}

/// `GET /api/claim`: The claim endpoint only accepts `POST`.
#[instrument(skip_all)]
pub async fn get_claim() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(MethodNotAllowedBody {
            error: "Method Not Allowed".to_string(),
            use_method: "POST".to_string(),
        }),
    )
}

/// `OPTIONS /api/claim`: CORS preflight for the claim endpoint.
#[instrument(skip_all)]
pub async fn options_claim(
    State(server): State<Arc<ClaimServer>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    preflight(&headers, &server.cors_fallback_origin)
}

/// `POST /api/claim`: Reject, challenge, or grant a claim.
///
/// The body is parsed leniently. A body that is not declared `application/json`, or does
/// not parse, counts as a missing proof.
#[instrument(skip_all)]
pub async fn post_claim(
    State(server): State<Arc<ClaimServer>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let body: Value = if is_json_content(&headers) {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    } else {
        Value::Null
    };
    let resolved_marker = headers
        .get(X_PAYMENT_RESOLVED)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("(none)");
    tracing::info!(
        proof = body.get("proof").is_some(),
        x_payment = headers.contains_key(X_PAYMENT),
        x_payment_resolved = resolved_marker,
        "Claim attempt"
    );

    let decision = server.decide(&body, &headers);
    match &decision {
        ClaimDecision::Reject => tracing::warn!("Claim rejected: missing or invalid proof"),
        ClaimDecision::Challenge(token) => tracing::info!(challenge = %token, "Claim challenged"),
        ClaimDecision::Grant(reward) => tracing::info!(reward = %reward, "Claim granted"),
    }
    decision
}

/// `Content-Type` is `application/json`, parameters such as `charset` ignored.
fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

/// Fallback for unmatched routes and methods.
#[instrument(skip_all)]
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "Not Found".to_string(),
            path: uri.path().to_string(),
        }),
    )
}

/// Answers claim preflights ahead of the generic CORS layer, which would reply `200`.
pub async fn claim_preflight(
    State(server): State<Arc<ClaimServer>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if request.method() == Method::OPTIONS && (path == CLAIM_PATH || path == CLAIM_PATH_SLASH) {
        return preflight(request.headers(), &server.cors_fallback_origin);
    }
    next.run(request).await
}

fn preflight(headers: &HeaderMap, fallback_origin: &HeaderValue) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .cloned()
        .unwrap_or_else(|| fallback_origin.clone());
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, origin),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(PREFLIGHT_ALLOW_METHODS),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(PREFLIGHT_ALLOW_HEADERS),
            ),
        ],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::{ChallengeLedger, DEFAULT_CHALLENGE_TOKEN};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(server: ClaimServer) -> Router {
        crate::app(Arc::new(server))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    fn post(body: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(CLAIM_PATH)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_proof_without_payment_is_challenged() {
        let (status, headers, body) =
            send(app(ClaimServer::default()), post(r#"{"proof":{"verified":true}}"#, &[])).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            headers.get("x402-payment-request").unwrap(),
            DEFAULT_CHALLENGE_TOKEN
        );
        assert_eq!(
            body,
            json!({
                "error": "Payment Required",
                "message": "X-PAYMENT header required to complete claim"
            })
        );
    }

    #[tokio::test]
    async fn test_missing_proof_is_rejected() {
        let (status, headers, body) = send(app(ClaimServer::default()), post("{}", &[])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing or invalid EZKL proof in body"}));
        assert!(headers.get("x402-payment-request").is_none());
    }

    #[tokio::test]
    async fn test_invalid_proof_cannot_be_bypassed_by_payment() {
        for body in ["{}", r#"{"proof":null}"#, r#"{"proof":{}}"#, "not json", ""] {
            let (status, _, response) = send(
                app(ClaimServer::default()),
                post(body, &[("X-PAYMENT", "sig123")]),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
            assert_eq!(response["error"], "Missing or invalid EZKL proof in body");
        }
    }

    #[tokio::test]
    async fn test_body_without_json_content_type_is_rejected() {
        for content_type in [Some("text/plain"), None] {
            let mut builder = Request::builder().method("POST").uri(CLAIM_PATH);
            if let Some(content_type) = content_type {
                builder = builder.header("Content-Type", content_type);
            }
            let request = builder
                .body(Body::from(r#"{"proof":{"verified":true}}"#))
                .unwrap();
            let (status, headers, body) = send(app(ClaimServer::default()), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "content type {content_type:?}");
            assert_eq!(body, json!({"error": "Missing or invalid EZKL proof in body"}));
            assert!(headers.get("x402-payment-request").is_none());
        }
    }

    #[tokio::test]
    async fn test_json_content_type_with_charset_is_parsed() {
        let request = Request::builder()
            .method("POST")
            .uri(CLAIM_PATH)
            .header("Content-Type", "Application/JSON; charset=utf-8")
            .body(Body::from(r#"{"proof":{"verified":true}}"#))
            .unwrap();
        let (status, headers, _) = send(app(ClaimServer::default()), request).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert!(headers.get("x402-payment-request").is_some());
    }

    #[tokio::test]
    async fn test_signed_payment_is_granted() {
        let (status, _, body) = send(
            app(ClaimServer::default()),
            post(r#"{"proof":{"proofId":"abc"}}"#, &[("X-PAYMENT", "sig123")]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "reward": "1.0 PRP"}));
    }

    #[tokio::test]
    async fn test_resolution_marker_is_granted() {
        let (status, _, body) = send(
            app(ClaimServer::default()),
            post(
                r#"{"proof":{"classification":"calm"},"paymentResolved":true}"#,
                &[("X-Payment-Resolved", "shielded")],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reward"], "1.0 PRP");
    }

    #[tokio::test]
    async fn test_empty_payment_header_is_challenged() {
        let (status, headers, _) = send(
            app(ClaimServer::default()),
            post(r#"{"proof":{"verified":true}}"#, &[("X-PAYMENT", "")]),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert!(headers.contains_key("x402-payment-request"));
    }

    #[tokio::test]
    async fn test_trailing_slash_route() {
        let request = Request::builder()
            .method("POST")
            .uri(CLAIM_PATH_SLASH)
            .header("X-PAYMENT", "sig")
            .body(Body::from(r#"{"proof":{"verified":true}}"#))
            .unwrap();
        let (status, _, _) = send(app(ClaimServer::default()), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_discovery_and_method_not_allowed() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, _, body) = send(app(ClaimServer::default()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"ok": true, "message": "X402 claim API", "claim": "POST /api/claim"})
        );

        let request = Request::builder().uri(CLAIM_PATH).body(Body::empty()).unwrap();
        let (status, _, body) = send(app(ClaimServer::default()), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"error": "Method Not Allowed", "use": "POST"}));
    }

    #[tokio::test]
    async fn test_unmatched_route_is_json_404() {
        let request = Request::builder()
            .uri("/api/other")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(app(ClaimServer::default()), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not Found", "path": "/api/other"}));

        let request = Request::builder()
            .method("PUT")
            .uri(CLAIM_PATH)
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(app(ClaimServer::default()), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preflight_echoes_origin() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(CLAIM_PATH)
            .header("Origin", "http://localhost:3000")
            .header("Access-Control-Request-Method", "POST")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(app(ClaimServer::default()), request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            headers.get("access-control-allow-methods").unwrap(),
            "POST, OPTIONS"
        );
        assert_eq!(
            headers.get("access-control-allow-headers").unwrap(),
            "Content-Type, X-PAYMENT, X-Payment-Resolved"
        );
    }

    #[tokio::test]
    async fn test_preflight_falls_back_to_default_origin() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(CLAIM_PATH_SLASH)
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(app(ClaimServer::default()), request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            DEFAULT_CORS_ORIGIN
        );
    }

    #[tokio::test]
    async fn test_ledger_mode_grants_each_challenge_once() {
        let server = Arc::new(ClaimServer::new(
            ChallengeIssuer::Ledger(ChallengeLedger::new(Duration::from_secs(60))),
            Reward::default(),
        ));
        let router = crate::app(server);
        let proof = r#"{"proof":{"proofId":"abc"}}"#;

        // Paying without having been challenged is answered with a challenge.
        let (status, headers, _) =
            send(router.clone(), post(proof, &[("X-PAYMENT", "sig")])).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        let token = headers.get("x402-payment-request").unwrap().clone();
        assert_ne!(token, DEFAULT_CHALLENGE_TOKEN);

        let (status, _, body) = send(router.clone(), post(proof, &[("X-PAYMENT", "sig")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reward"], "1.0 PRP");

        // Replaying the same paid request is challenged again.
        let (status, headers, _) = send(router, post(proof, &[("X-PAYMENT", "sig")])).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_ne!(headers.get("x402-payment-request").unwrap(), &token);
    }

    #[test]
    fn test_decide_order() {
        let server = ClaimServer::default();
        let mut paid = HeaderMap::new();
        paid.insert("x-payment", HeaderValue::from_static("sig"));

        assert_eq!(server.decide(&json!({}), &paid), ClaimDecision::Reject);
        assert_eq!(
            server.decide(&json!({"proof": {"verified": true}}), &HeaderMap::new()),
            ClaimDecision::Challenge(ChallengeToken::new(DEFAULT_CHALLENGE_TOKEN))
        );
        assert_eq!(
            server.decide(&json!({"proof": {"verified": true}}), &paid),
            ClaimDecision::Grant("1.0 PRP".to_string())
        );
    }
}
