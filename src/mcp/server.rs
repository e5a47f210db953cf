// gemini-mcp -- mcp/server
//! MCP server: exposes the Gemini tools as a JSON-RPC 2.0 endpoint over HTTP.
//!
//! Supported methods:
//! - `initialize`: server info + capabilities
//! - `tools/list`: the four static tool descriptors
//! - `tools/call`: execute a tool
//!
//! Anything else is `-32601`. A body that does not parse as a request object
//! is `-32603` with HTTP 500 and the fallback id.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::protocol::{
    RpcRequest, RpcResponse, ToolCallParams, ToolResult, FALLBACK_ID, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PROTOCOL_VERSION,
};
use super::tools;
use crate::models::SERVICE_NAME;
use crate::state::AppState;

/// GET /mcp: static server descriptor.
pub async fn mcp_info() -> Json<RpcResponse> {
    Json(RpcResponse::unsolicited(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": ["tools"]
    })))
}

/// POST /mcp: JSON-RPC 2.0 endpoint handler.
pub async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<RpcResponse>) {
    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("MCP error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RpcResponse::error(json!(FALLBACK_ID), INTERNAL_ERROR, e.to_string())),
            );
        }
    };

    (StatusCode::OK, Json(dispatch(&state, request).await))
}

/// Route one parsed request by method.
pub async fn dispatch(state: &AppState, request: RpcRequest) -> RpcResponse {
    let RpcRequest { id, method, params } = request;
    tracing::debug!(method = %method, "MCP server: incoming request");

    match method.as_str() {
        "initialize" => RpcResponse::ok(id, initialize_result()),
        "tools/list" => RpcResponse::ok(id, json!({ "tools": state.tools.descriptors() })),
        "tools/call" => handle_tools_call(state, id, params).await,
        _ => RpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", method)),
    }
}

// ── initialize ──────────────────────────────────────────────────────────────

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "serverInfo": {
            "name": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "capabilities": {
            "tools": { "listChanged": false }
        }
    })
}

// ── tools/call ──────────────────────────────────────────────────────────────

async fn handle_tools_call(state: &AppState, id: Value, params: Value) -> RpcResponse {
    // Named params only; serde would otherwise accept a positional array.
    let params: ToolCallParams = match params {
        Value::Null => ToolCallParams::default(),
        Value::Object(_) => match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return RpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e)),
        },
        other => {
            tracing::warn!("MCP tools/call: non-object params rejected");
            return RpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Invalid params: expected an object, got {}", json_kind(&other)),
            );
        }
    };

    tracing::info!(tool = %params.name, "MCP server: tools/call");

    let output = tools::call_tool(state, &params.name, params.arguments).await;
    RpcResponse::ok(id, json!(ToolResult::json_text(&output.to_json())))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
