// Shared helpers for integration tests: router plumbing plus a local stand-in
// for the Google token endpoint and the Vertex AI generateContent endpoint.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Json;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use gemini_mcp::config::{CredentialSource, GatewayConfig};
use gemini_mcp::state::AppState;

pub const TEST_PEM: &str = include_str!("../fixtures/test_service_account.pem");
pub const TEST_ACCESS_TOKEN: &str = "ya29.test-token";

/// How the fake Google side answers.
#[derive(Clone, Debug)]
pub enum Upstream {
    /// 200 with a well-formed candidate carrying this text.
    Text(String),
    /// Vertex answers with this status and raw body.
    Status(u16, String),
    /// 200 whose JSON lacks the candidate text.
    Raw(Value),
    /// The token endpoint refuses the assertion.
    TokenRejected,
    /// The token endpoint grants a token with this `expires_in`; Vertex answers "ok".
    TokenLifetime(i64),
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct FakeState {
    behaviour: Upstream,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    token_requests: Arc<AtomicUsize>,
}

pub struct FakeGoogle {
    pub base_url: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    token_requests: Arc<AtomicUsize>,
}

impl FakeGoogle {
    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    /// Gateway config pointing both the token exchange and Vertex at this fake.
    pub fn gateway_config(&self) -> GatewayConfig {
        let key = json!({
            "type": "service_account",
            "project_id": "test-project",
            "private_key_id": "test-key-id",
            "private_key": TEST_PEM,
            "client_email": "gateway@test-project.iam.gserviceaccount.com",
            "token_uri": format!("{}/token", self.base_url),
        });
        let mut config = GatewayConfig::new("test-project", CredentialSource::Inline(key.to_string()));
        config.api_base_url = Some(self.base_url.clone());
        config
    }

    pub fn router(&self) -> axum::Router {
        router_for(self.gateway_config())
    }
}

async fn token(State(s): State<FakeState>, body: String) -> Response {
    s.token_requests.fetch_add(1, Ordering::SeqCst);
    assert!(body.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"), "{body}");
    assert!(body.contains("assertion="), "{body}");

    if matches!(s.behaviour, Upstream::TokenRejected) {
        return (StatusCode::UNAUTHORIZED, r#"{"error":"invalid_grant"}"#).into_response();
    }
    let expires_in = match s.behaviour {
        Upstream::TokenLifetime(secs) => secs,
        _ => 3599,
    };
    Json(json!({
        "access_token": TEST_ACCESS_TOKEN,
        "expires_in": expires_in,
        "token_type": "Bearer"
    }))
    .into_response()
}

async fn vertex(State(s): State<FakeState>, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    s.recorded.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    match &s.behaviour {
        Upstream::TokenLifetime(_) => Json(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "ok" }] } }]
        }))
        .into_response(),
        Upstream::Text(text) => Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        Upstream::Status(code, body) => {
            (StatusCode::from_u16(*code).unwrap(), body.clone()).into_response()
        }
        Upstream::Raw(value) => Json(value.clone()).into_response(),
        Upstream::TokenRejected => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Start the fake on an ephemeral localhost port.
pub async fn spawn_fake_google(behaviour: Upstream) -> FakeGoogle {
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let token_requests = Arc::new(AtomicUsize::new(0));
    let state = FakeState {
        behaviour,
        recorded: recorded.clone(),
        token_requests: token_requests.clone(),
    };

    let app = axum::Router::new()
        .route("/token", post(token))
        .fallback(vertex)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeGoogle {
        base_url: format!("http://{}", addr),
        recorded,
        token_requests,
    }
}

pub fn router_for(config: GatewayConfig) -> axum::Router {
    gemini_mcp::create_router(AppState::new(config).unwrap())
}

/// Router whose credential source is missing: no request can leave the process.
pub fn offline_router() -> axum::Router {
    let config = GatewayConfig::new("test-project", CredentialSource::Missing);
    gemini_mcp::create_router(AppState::new(config).unwrap())
}

/// Collect a response body into a `serde_json::Value`.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn post_raw(app: axum::Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

/// JSON-RPC `tools/call` and the decoded inner text payload.
pub async fn call_tool(app: axum::Router, name: &str, arguments: Value) -> (StatusCode, Value, Value) {
    let (status, envelope) = post_json(
        app,
        "/mcp",
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }),
    )
    .await;
    let text = envelope["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("no text content in {envelope}"));
    let payload = serde_json::from_str(text).unwrap();
    (status, envelope, payload)
}
