// gemini-mcp -- mcp/tools
//! Static tool registry and the four tool handlers behind `tools/call`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::ModelCatalog;
use crate::error::ParamError;
use crate::models::{AnalyzeParams, ChatParams, GenerateParams, ModelListing, UpstreamResult};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GenerateContent,
    Chat,
    AnalyzeDocument,
    ListModels,
}

impl Tool {
    /// Registry order as reported by `tools/list`.
    pub const ALL: [Tool; 4] = [
        Tool::GenerateContent,
        Tool::Chat,
        Tool::AnalyzeDocument,
        Tool::ListModels,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::GenerateContent => "gemini_generate_content",
            Tool::Chat => "gemini_chat",
            Tool::AnalyzeDocument => "gemini_analyze_document",
            Tool::ListModels => "gemini_list_models",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    fn describe(self, catalog: &ModelCatalog) -> ToolDescriptor {
        let (description, input_schema) = match self {
            Tool::GenerateContent => (
                "Generate content using Gemini",
                json!({
                    "type": "object",
                    "properties": {
                        "prompt": { "type": "string", "description": "The prompt to generate content from" },
                        "model": { "type": "string", "enum": catalog.models, "default": catalog.default_model },
                        "max_tokens": { "type": "integer", "minimum": 1, "default": crate::config::DEFAULT_MAX_TOKENS },
                        "temperature": { "type": "number", "minimum": 0, "maximum": 2, "default": crate::config::DEFAULT_TEMPERATURE }
                    },
                    "required": ["prompt"]
                }),
            ),
            Tool::Chat => (
                "Multi-turn chat with Gemini",
                json!({
                    "type": "object",
                    "properties": {
                        "messages": {
                            "type": "array",
                            "description": "Chat messages in conversation order",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "role": { "type": "string", "description": "\"user\", anything else is treated as the model" },
                                    "content": { "type": "string" }
                                }
                            }
                        },
                        "model": { "type": "string", "enum": catalog.models, "default": catalog.default_model },
                        "system_instruction": { "type": "string" }
                    },
                    "required": ["messages"]
                }),
            ),
            Tool::AnalyzeDocument => (
                "Analyze document text with Gemini",
                json!({
                    "type": "object",
                    "properties": {
                        "document_text": { "type": "string" },
                        "analysis_prompt": { "type": "string", "default": crate::models::DEFAULT_ANALYSIS_PROMPT },
                        "model": { "type": "string", "enum": catalog.models, "default": catalog.analysis_model }
                    },
                    "required": ["document_text", "analysis_prompt"]
                }),
            ),
            Tool::ListModels => (
                "List available Gemini models",
                json!({ "type": "object", "properties": {} }),
            ),
        };

        ToolDescriptor {
            name: self.name(),
            description,
            input_schema,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool descriptors, built once from the model catalog at startup.
#[derive(Debug)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new(catalog: &ModelCatalog) -> Self {
        Self {
            descriptors: Tool::ALL.iter().map(|t| t.describe(catalog)).collect(),
        }
    }

    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }
}

/// Payload of one `tools/call`, before it is wrapped in the content envelope.
#[derive(Debug)]
pub enum ToolOutput {
    Upstream(UpstreamResult),
    Models(ModelListing),
    UnknownTool(String),
}

impl ToolOutput {
    pub fn to_json(&self) -> Value {
        match self {
            ToolOutput::Upstream(result) => json!(result),
            ToolOutput::Models(listing) => json!(listing),
            // Result-shaped, not a JSON-RPC error.
            ToolOutput::UnknownTool(name) => json!({ "error": format!("Unknown tool: {}", name) }),
        }
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ParamError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| ParamError::Malformed(e.to_string()))
}

/// Run the named tool. Never fails: bad arguments and upstream problems both
/// come back as `UpstreamResult::Failure`.
pub async fn call_tool(state: &AppState, name: &str, arguments: Value) -> ToolOutput {
    let Some(tool) = Tool::from_name(name) else {
        tracing::warn!(tool = %name, "MCP tools/call: unknown tool");
        return ToolOutput::UnknownTool(name.to_string());
    };

    let config = &state.config;
    let result = match tool {
        Tool::ListModels => return ToolOutput::Models(ModelListing::from(&config.catalog)),
        Tool::GenerateContent => match parse_args::<GenerateParams>(arguments).and_then(|p| p.validate(config)) {
            Ok(req) => state.vertex.generate(&req).await,
            Err(e) => e.into(),
        },
        Tool::Chat => match parse_args::<ChatParams>(arguments).and_then(|p| p.validate(config)) {
            Ok(req) => state.vertex.chat(&req).await,
            Err(e) => e.into(),
        },
        Tool::AnalyzeDocument => match parse_args::<AnalyzeParams>(arguments).and_then(|p| p.validate(config)) {
            Ok(req) => state.vertex.generate(&req).await,
            Err(e) => e.into(),
        },
    };

    ToolOutput::Upstream(result)
}
