// gemini-mcp -- mcp
//! MCP (Model Context Protocol) server.
//!
//! **Server** (`server`): JSON-RPC 2.0 over HTTP at `/mcp`.
//! **Tools** (`tools`): the static registry and the four Gemini tool handlers.
//! **Protocol** (`protocol`): request/response envelopes and error codes.
//!
//! Protocol revision: <https://spec.modelcontextprotocol.io/2024-11-05/>

pub mod protocol;
pub mod server;
pub mod tools;
