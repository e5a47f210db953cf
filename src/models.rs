use serde::ser::SerializeMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use crate::config::{GatewayConfig, ModelCatalog};
use crate::error::ParamError;

pub const SERVICE_NAME: &str = "gemini-mcp";
pub const DEFAULT_ANALYSIS_PROMPT: &str = "Analyze this document:";

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelListing {
    pub models: Vec<String>,
    pub default: String,
}

impl From<&ModelCatalog> for ModelListing {
    fn from(catalog: &ModelCatalog) -> Self {
        Self {
            models: catalog.models.clone(),
            default: catalog.default_model.clone(),
        }
    }
}

fn resolve_model(requested: Option<String>, fallback: &str, catalog: &ModelCatalog) -> Result<String, ParamError> {
    let model = requested.unwrap_or_else(|| fallback.to_string());
    if catalog.contains(&model) {
        Ok(model)
    } else {
        Err(ParamError::UnknownModel {
            model,
            available: catalog.models.join(", "),
        })
    }
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// Single-turn generation parameters as they arrive on the wire.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateParams {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "whole_number")]
    pub max_tokens: Option<i64>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Integer field that also takes a float with no fractional part (`100.0`).
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let Some(n) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(i) = n.as_i64() {
        return Ok(Some(i));
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => Ok(Some(f as i64)),
        _ => Err(de::Error::custom(format!("expected a whole number, got {}", n))),
    }
}

/// Validated single-turn request, every default resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl GenerateParams {
    pub fn validate(self, config: &GatewayConfig) -> Result<GenerateRequest, ParamError> {
        let model = resolve_model(self.model, &config.catalog.default_model, &config.catalog)?;

        let max_tokens = match self.max_tokens {
            None => config.defaults.max_tokens,
            Some(n) if n > 0 => u32::try_from(n).map_err(|_| ParamError::InvalidMaxTokens(n))?,
            Some(n) => return Err(ParamError::InvalidMaxTokens(n)),
        };

        let temperature = match self.temperature {
            None => config.defaults.temperature,
            Some(t) if (0.0..=2.0).contains(&t) => t,
            Some(t) => return Err(ParamError::InvalidTemperature(t)),
        };

        Ok(GenerateRequest {
            prompt: self.prompt,
            model,
            max_tokens,
            temperature,
        })
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Provider-side conversation role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Only the literal `"user"` is a user turn; everything else is the model.
    pub fn from_wire(role: &str) -> Self {
        if role == "user" { Role::User } else { Role::Model }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatParams {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_instruction: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub turns: Vec<ChatTurn>,
    pub model: String,
    pub system_instruction: Option<String>,
}

impl ChatParams {
    pub fn validate(self, config: &GatewayConfig) -> Result<ChatRequest, ParamError> {
        let model = resolve_model(self.model, &config.catalog.default_model, &config.catalog)?;
        let turns = self
            .messages
            .into_iter()
            .map(|m| ChatTurn {
                role: Role::from_wire(&m.role),
                content: m.content,
            })
            .collect();

        Ok(ChatRequest {
            turns,
            model,
            system_instruction: self.system_instruction.filter(|s| !s.is_empty()),
        })
    }
}

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalyzeParams {
    #[serde(default)]
    pub document_text: String,
    #[serde(default)]
    pub analysis_prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl AnalyzeParams {
    /// Instruction and document joined by a blank line.
    pub fn prompt(&self) -> String {
        let instruction = self.analysis_prompt.as_deref().unwrap_or(DEFAULT_ANALYSIS_PROMPT);
        format!("{}\n\n{}", instruction, self.document_text)
    }

    pub fn validate(self, config: &GatewayConfig) -> Result<GenerateRequest, ParamError> {
        let prompt = self.prompt();
        let model = resolve_model(self.model, &config.catalog.analysis_model, &config.catalog)?;
        Ok(GenerateRequest {
            prompt,
            model,
            max_tokens: config.defaults.max_tokens,
            temperature: config.defaults.temperature,
        })
    }
}

// ---------------------------------------------------------------------------
// Upstream result
// ---------------------------------------------------------------------------

/// Normalized outcome of one upstream call, shared by the MCP and REST layers.
///
/// Serializes as `{"success": true, "text": .., "model": ..}` or
/// `{"success": false, "error": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamResult {
    Success { text: String, model: String },
    Failure { error: String },
}

impl UpstreamResult {
    pub fn failure(error: impl std::fmt::Display) -> Self {
        UpstreamResult::Failure {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UpstreamResult::Success { .. })
    }
}

impl From<ParamError> for UpstreamResult {
    fn from(err: ParamError) -> Self {
        UpstreamResult::failure(format!("invalid arguments: {}", err))
    }
}

impl Serialize for UpstreamResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UpstreamResult::Success { text, model } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("text", text)?;
                map.serialize_entry("model", model)?;
                map.end()
            }
            UpstreamResult::Failure { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSource;
    use serde_json::json;

    fn config() -> GatewayConfig {
        GatewayConfig::new("demo", CredentialSource::Missing)
    }

    fn generate(args: serde_json::Value) -> Result<GenerateRequest, ParamError> {
        serde_json::from_value::<GenerateParams>(args).unwrap().validate(&config())
    }

    #[test]
    fn generate_applies_defaults() {
        let req = generate(json!({ "prompt": "hi" })).unwrap();
        assert_eq!(req.model, "gemini-2.0-flash-exp");
        assert_eq!(req.max_tokens, 8192);
        assert!((req.temperature - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_max_tokens_is_rejected() {
        let err = generate(json!({ "prompt": "hi", "max_tokens": -5 })).unwrap_err();
        assert_eq!(err, ParamError::InvalidMaxTokens(-5));
    }

    #[test]
    fn whole_float_max_tokens_is_an_integer() {
        let req = generate(json!({ "prompt": "hi", "max_tokens": 100.0 })).unwrap();
        assert_eq!(req.max_tokens, 100);
    }

    #[test]
    fn fractional_max_tokens_fails_to_parse() {
        assert!(serde_json::from_value::<GenerateParams>(json!({ "prompt": "hi", "max_tokens": 1.5 })).is_err());
    }

    #[test]
    fn null_max_tokens_uses_default() {
        let req = generate(json!({ "prompt": "hi", "max_tokens": null })).unwrap();
        assert_eq!(req.max_tokens, 8192);
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        assert!(generate(json!({ "prompt": "hi", "max_tokens": 0 })).is_err());
    }

    #[test]
    fn temperature_bounds_are_inclusive() {
        assert!(generate(json!({ "prompt": "hi", "temperature": 0.0 })).is_ok());
        assert!(generate(json!({ "prompt": "hi", "temperature": 2.0 })).is_ok());
        let err = generate(json!({ "prompt": "hi", "temperature": 2.5 })).unwrap_err();
        assert_eq!(err, ParamError::InvalidTemperature(2.5));
    }

    #[test]
    fn model_outside_allow_list_is_rejected() {
        let err = generate(json!({ "prompt": "hi", "model": "gpt-4" })).unwrap_err();
        assert!(matches!(err, ParamError::UnknownModel { ref model, .. } if model == "gpt-4"));
    }

    #[test]
    fn missing_prompt_fails_to_parse() {
        assert!(serde_json::from_value::<GenerateParams>(json!({ "model": "gemini-1.5-pro" })).is_err());
    }

    #[test]
    fn role_mapping_only_keeps_literal_user() {
        assert_eq!(Role::from_wire("user"), Role::User);
        assert_eq!(Role::from_wire("assistant"), Role::Model);
        assert_eq!(Role::from_wire("model"), Role::Model);
        assert_eq!(Role::from_wire("User"), Role::Model);
        assert_eq!(Role::from_wire(""), Role::Model);
    }

    #[test]
    fn chat_defaults_to_no_messages() {
        let req = serde_json::from_value::<ChatParams>(json!({}))
            .unwrap()
            .validate(&config())
            .unwrap();
        assert!(req.turns.is_empty());
        assert_eq!(req.model, "gemini-2.0-flash-exp");
        assert!(req.system_instruction.is_none());
    }

    #[test]
    fn empty_system_instruction_counts_as_absent() {
        let req = serde_json::from_value::<ChatParams>(json!({ "messages": [], "system_instruction": "" }))
            .unwrap()
            .validate(&config())
            .unwrap();
        assert!(req.system_instruction.is_none());
    }

    #[test]
    fn analyze_joins_instruction_and_document() {
        let params: AnalyzeParams = serde_json::from_value(json!({
            "document_text": "Hello",
            "analysis_prompt": "Summarize:"
        }))
        .unwrap();
        let req = params.validate(&config()).unwrap();
        assert_eq!(req.prompt, "Summarize:\n\nHello");
        assert_eq!(req.model, "gemini-1.5-pro");
    }

    #[test]
    fn analyze_uses_generic_instruction_when_absent() {
        let params: AnalyzeParams = serde_json::from_value(json!({ "document_text": "doc" })).unwrap();
        assert_eq!(params.prompt(), "Analyze this document:\n\ndoc");
    }

    #[test]
    fn upstream_result_serializes_exactly_one_branch() {
        let ok = serde_json::to_value(UpstreamResult::Success {
            text: "t".into(),
            model: "m".into(),
        })
        .unwrap();
        assert_eq!(ok, json!({ "success": true, "text": "t", "model": "m" }));
        assert!(ok.get("error").is_none());

        let failed = serde_json::to_value(UpstreamResult::failure("boom")).unwrap();
        assert_eq!(failed, json!({ "success": false, "error": "boom" }));
        assert!(failed.get("text").is_none());
    }

    #[test]
    fn param_error_becomes_failure() {
        let result = UpstreamResult::from(ParamError::InvalidMaxTokens(-1));
        assert!(!result.is_success());
        assert_eq!(
            result,
            UpstreamResult::failure("invalid arguments: max_tokens must be a positive integer, got -1")
        );
    }
}
