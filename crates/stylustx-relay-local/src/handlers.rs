//! HTTP endpoints of the relayer.
//!
//! | Method | Path      | Body                  | Response                               |
//! |--------|-----------|-----------------------|----------------------------------------|
//! | `GET`  | `/health` |                       | `{"status":"ok"}`                      |
//! | `GET`  | `/info`   |                       | [`RelayInfo`]                          |
//! | `POST` | `/digest` | `Authorization`       | `{"payloadHash","encoded","digest"}`   |
//! | `POST` | `/verify` | `SignedAuthorization` | [`VerifyResponse`]                     |
//! | `POST` | `/relay`  | `SignedAuthorization` | `ExecutionOutcome`                     |
//!
//! A failed submission is still a `200` carrying `success: false`. Errors before
//! submission map to status codes: verification failure `422`, chain read failure
//! `502`, no relayer configured `503`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use stylustx_types::authorization::{Authorization, SignedAuthorization};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::relay_local::{RelayLocal, RelayLocalError};

pub fn routes() -> Router<Arc<RelayLocal>> {
    Router::new()
        .route("/", get(get_root))
        .route("/health", get(get_health))
        .route("/info", get(get_info))
        .route("/digest", post(post_digest))
        .route("/verify", post(post_verify))
        .route("/relay", post(post_relay))
}

pub async fn get_root() -> impl IntoResponse {
    let pkg_name = env!("CARGO_PKG_NAME");
    (StatusCode::OK, format!("Hello from {pkg_name}!"))
}

pub async fn get_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_info(State(relay): State<Arc<RelayLocal>>) -> impl IntoResponse {
    Json(relay.info())
}

#[cfg_attr(feature = "telemetry", instrument(skip_all))]
pub async fn post_digest(
    State(relay): State<Arc<RelayLocal>>,
    Json(authorization): Json<Authorization>,
) -> impl IntoResponse {
    Json(relay.digest(&authorization))
}

#[cfg_attr(feature = "telemetry", instrument(skip_all))]
pub async fn post_verify(
    State(relay): State<Arc<RelayLocal>>,
    Json(signed): Json<SignedAuthorization>,
) -> Response {
    match relay.verify(&signed).await {
        Ok(response) => Json(response).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg_attr(feature = "telemetry", instrument(skip_all))]
pub async fn post_relay(
    State(relay): State<Arc<RelayLocal>>,
    Json(signed): Json<SignedAuthorization>,
) -> Response {
    match relay.relay(&signed).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(error) => error.into_response(),
    }
}

impl RelayLocalError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayLocalError::Verification(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayLocalError::Chain(_) => StatusCode::BAD_GATEWAY,
            RelayLocalError::Relay(_) => StatusCode::SERVICE_UNAVAILABLE,
            RelayLocalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayLocalError {
    fn into_response(self) -> Response {
        #[cfg(feature = "telemetry")]
        tracing::warn!(error = %self, "request failed");
        let body = match &self {
            RelayLocalError::Verification(reason) => json!({
                "valid": false,
                "reason": reason.to_string(),
            }),
            other => json!({ "error": other.to_string() }),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256, address};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use stylustx_chain_eip155::meta_tx::test_utils::{MockPaymaster, TestSigner};
    use stylustx_chain_eip155::meta_tx::AuthorizationBuilder;
    use stylustx_types::chain::ChainId;
    use stylustx_types::state::OnChainState;
    use tower::ServiceExt;

    const TARGET: Address = address!("0xbbbb000000000000000000000000000000000002");

    fn app(paymaster: Arc<MockPaymaster>) -> Router {
        let relay = RelayLocal::new(ChainId::eip155(421614), Address::repeat_byte(0x11), paymaster.clone())
            .with_submitter(paymaster);
        routes().with_state(Arc::new(relay))
    }

    async fn signed() -> SignedAuthorization {
        let signer = TestSigner::key_one();
        let actor = signer.address().to_string();
        let builder = AuthorizationBuilder::with_signer(signer);
        let authorization = builder
            .build(&actor, &TARGET.to_string(), U256::ZERO, vec![0x12, 0x34], U256::ZERO, 300)
            .unwrap();
        builder.sign(&authorization).await.unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json<T: serde::Serialize>(uri: &str, body: &T) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let paymaster = Arc::new(MockPaymaster::new(OnChainState::active(TARGET)));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(paymaster), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_digest_matches_vector() {
        let paymaster = Arc::new(MockPaymaster::new(OnChainState::active(TARGET)));
        let authorization = json!({
            "actor": "0xaaaa000000000000000000000000000000000001",
            "target": "0xbbbb000000000000000000000000000000000002",
            "value": "0x0",
            "payload": "0x1234",
            "nonce": "0x0",
            "deadline": "0x6553f22c",
        });
        let (status, body) = send(app(paymaster), post_json("/digest", &authorization)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["digest"],
            "0xa992d2bad5c589c6206724ed744ea8270c703eb581123490a17860b5998a0fee"
        );
        assert_eq!(
            body["payloadHash"],
            "0x56570de287d73cd1cb6092bb8fdee6173974955fdef345ae579ee9f475ea7432"
        );
    }

    #[tokio::test]
    async fn test_verify_and_relay() {
        let paymaster = Arc::new(MockPaymaster::new(OnChainState::active(TARGET)));
        let signed = signed().await;

        let (status, body) = send(app(paymaster.clone()), post_json("/verify", &signed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "valid": true }));

        let (status, body) = send(app(paymaster.clone()), post_json("/relay", &signed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = send(app(paymaster.clone()), post_json("/relay", &signed)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["valid"], false);
        assert!(body["reason"].as_str().unwrap().contains("Nonce mismatch"));

        let (status, body) = send(app(paymaster), post_json("/verify", &signed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
    }

    #[tokio::test]
    async fn test_chain_failure_is_bad_gateway() {
        let paymaster = Arc::new(MockPaymaster::new(OnChainState::active(TARGET)));
        paymaster.set_reads_fail(true);
        let (status, body) = send(app(paymaster), post_json("/relay", &signed().await)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let paymaster = Arc::new(MockPaymaster::new(OnChainState::active(TARGET)));
        let (status, _) = send(app(paymaster), post_json("/verify", &json!({ "actor": "0x12" }))).await;
        assert!(status.is_client_error());
    }
}
