// ---------------------------------------------------------------------------
// vertex.rs — Vertex AI Gemini `generateContent` client
// ---------------------------------------------------------------------------
//
// Two call shapes (single prompt, multi-turn chat) share one send path:
// token → POST → unwrap text or fail. Every outcome is folded into an
// `UpstreamResult`; nothing here returns an error to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::GatewayConfig;
use crate::error::{AuthError, UpstreamError};
use crate::models::{ChatRequest, GenerateRequest, UpstreamResult};
use crate::oauth::CredentialProvider;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const ERROR_BODY_LIMIT: usize = 500;

/// Shared HTTP client for the token endpoint and Vertex AI.
pub fn build_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .pool_max_idle_per_host(10)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
}

/// Keep at most `max` characters (not bytes) of `s`.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[derive(Clone)]
pub struct VertexClient {
    http: Client,
    config: Arc<GatewayConfig>,
    credentials: CredentialProvider,
}

impl VertexClient {
    pub fn new(http: Client, config: Arc<GatewayConfig>, credentials: CredentialProvider) -> Self {
        Self {
            http,
            config,
            credentials,
        }
    }

    pub async fn generate(&self, req: &GenerateRequest) -> UpstreamResult {
        let payload = generate_payload(req);
        self.call(&req.model, &payload, "generate").await
    }

    pub async fn chat(&self, req: &ChatRequest) -> UpstreamResult {
        let payload = chat_payload(req);
        self.call(&req.model, &payload, "chat").await
    }

    async fn call(&self, model: &str, payload: &Value, kind: &'static str) -> UpstreamResult {
        let started = std::time::Instant::now();
        match self.generate_content(model, payload).await {
            Ok(text) => {
                tracing::info!(
                    kind,
                    model = %model,
                    chars = text.chars().count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Vertex AI call succeeded"
                );
                UpstreamResult::Success {
                    text,
                    model: model.to_string(),
                }
            }
            Err(e) => {
                tracing::error!(kind, model = %model, "Vertex AI call failed: {}", e);
                UpstreamResult::failure(e)
            }
        }
    }

    async fn generate_content(&self, model: &str, payload: &Value) -> Result<String, UpstreamError> {
        let credentials = self.credentials.acquire_token().await?;
        if credentials.is_expired() {
            return Err(AuthError::Expired(credentials.expiry).into());
        }

        let resp = self
            .http
            .post(self.config.generate_content_url(model))
            .bearer_auth(&credentials.token)
            .json(payload)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_LIMIT),
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        extract_text(&body)
    }
}

// ── Payloads ────────────────────────────────────────────────────────────────

pub(crate) fn generate_payload(req: &GenerateRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": req.prompt }]
        }],
        "generationConfig": {
            "maxOutputTokens": req.max_tokens,
            "temperature": req.temperature
        }
    })
}

pub(crate) fn chat_payload(req: &ChatRequest) -> Value {
    let contents: Vec<Value> = req
        .turns
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role,
                "parts": [{ "text": turn.content }]
            })
        })
        .collect();

    let mut payload = json!({ "contents": contents });
    if let Some(instruction) = &req.system_instruction {
        payload["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
    }
    payload
}

// ── Response unwrapping ─────────────────────────────────────────────────────

/// `candidates[0].content.parts[0].text`, or a diagnostic failure.
pub(crate) fn extract_text(body: &Value) -> Result<String, UpstreamError> {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| UpstreamError::MissingText(diagnose(body)))
}

/// Explain why a 200 response carried no text.
fn diagnose(body: &Value) -> String {
    let mut diag = Vec::new();

    if let Some(reason) = body.pointer("/promptFeedback/blockReason").and_then(Value::as_str) {
        diag.push(format!("promptFeedback.blockReason={}", reason));
    }

    match body.get("candidates").and_then(Value::as_array) {
        None => diag.push("no 'candidates' field in response".to_string()),
        Some(candidates) if candidates.is_empty() => diag.push("candidates array is empty".to_string()),
        Some(candidates) => {
            let c0 = &candidates[0];
            if let Some(reason) = c0.get("finishReason").and_then(Value::as_str) {
                diag.push(format!("finishReason={}", reason));
            }
            if c0.get("content").is_none() {
                diag.push("candidate has no 'content' field".to_string());
            } else if c0.pointer("/content/parts/0").is_none() {
                diag.push("candidate content has no parts".to_string());
            } else {
                diag.push("first part has no text".to_string());
            }
        }
    }

    diag.join(", ")
}
