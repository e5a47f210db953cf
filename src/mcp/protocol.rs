// gemini-mcp -- mcp/protocol
//! JSON-RPC 2.0 envelope types used by the MCP endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const INVALID_PARAMS: i32 = -32602;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;

/// Id used when the request carries none, or could not be parsed at all.
pub const FALLBACK_ID: i64 = 1;

fn fallback_id() -> Value {
    json!(FALLBACK_ID)
}

/// Inbound request. An explicit `"id": null` is kept as `Null`; only an absent
/// id falls back to [`FALLBACK_ID`].
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default = "fallback_id")]
    pub id: Value,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// `params` of a `tools/call` request.
#[derive(Debug, Default, Deserialize)]
pub struct ToolCallParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Some(id),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Result without an id, for the bare `GET /mcp` descriptor.
    pub fn unsolicited(result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: None,
            result: Some(result),
            error: None,
        }
    }
}

/// MCP tool-result envelope: one text block holding compact JSON.
#[derive(Debug, Serialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
}

#[derive(Debug, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ToolResult {
    pub fn json_text(payload: &Value) -> Self {
        Self {
            content: vec![ToolContent {
                kind: "text",
                text: payload.to_string(),
            }],
        }
    }
}
