// ---------------------------------------------------------------------------
// config.rs — process configuration, resolved once at startup
// ---------------------------------------------------------------------------

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

const DEFAULT_MODELS: [&str; 3] = ["gemini-2.0-flash-exp", "gemini-1.5-pro", "gemini-1.5-flash"];
const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
const DEFAULT_ANALYSIS_MODEL: &str = "gemini-1.5-pro";

/// Where the service-account secret comes from.
#[derive(Clone, PartialEq)]
pub enum CredentialSource {
    /// Raw service-account JSON (GOOGLE_CREDENTIALS_JSON).
    Inline(String),
    /// Path to a service-account JSON file (GOOGLE_APPLICATION_CREDENTIALS).
    File(PathBuf),
    Missing,
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Inline(_) => f.write_str("Inline(<redacted>)"),
            CredentialSource::File(path) => f.debug_tuple("File").field(path).finish(),
            CredentialSource::Missing => f.write_str("Missing"),
        }
    }
}

/// Allow-list of models plus the defaults applied when a caller omits `model`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCatalog {
    pub models: Vec<String>,
    pub default_model: String,
    pub analysis_model: String,
}

impl ModelCatalog {
    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            default_model: DEFAULT_MODEL.to_string(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationDefaults {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Immutable gateway configuration. Built once, shared via `Arc` in `AppState`.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub project_id: String,
    pub location: String,
    pub credentials: CredentialSource,
    pub catalog: ModelCatalog,
    pub defaults: GenerationDefaults,
    /// Overrides `https://{location}-aiplatform.googleapis.com` (emulators, tests).
    pub api_base_url: Option<String>,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl GatewayConfig {
    /// Minimal config with library defaults; used by tests and embedders.
    pub fn new(project_id: impl Into<String>, credentials: CredentialSource) -> Self {
        Self {
            project_id: project_id.into(),
            location: DEFAULT_LOCATION.to_string(),
            credentials,
            catalog: ModelCatalog::default(),
            defaults: GenerationDefaults::default(),
            api_base_url: None,
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let project_id = get("GOOGLE_PROJECT_ID").ok_or(ConfigError::Missing("GOOGLE_PROJECT_ID"))?;
        let location = get("GOOGLE_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        // Inline JSON wins; a file path only counts when the file exists.
        let credentials = match (get("GOOGLE_CREDENTIALS_JSON"), get("GOOGLE_APPLICATION_CREDENTIALS")) {
            (Some(json), _) => CredentialSource::Inline(json),
            (None, Some(path)) if std::path::Path::new(&path).exists() => {
                CredentialSource::File(PathBuf::from(path))
            }
            (None, Some(path)) => {
                tracing::warn!(path = %path, "GOOGLE_APPLICATION_CREDENTIALS points to a missing file");
                CredentialSource::Missing
            }
            (None, None) => CredentialSource::Missing,
        };

        let mut catalog = ModelCatalog::default();
        if let Some(list) = get("GEMINI_MODELS") {
            catalog.models = list
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(model) = get("GEMINI_DEFAULT_MODEL") {
            catalog.default_model = model;
        }
        if let Some(model) = get("GEMINI_ANALYSIS_MODEL") {
            catalog.analysis_model = model;
        }
        validate_catalog(&catalog)?;

        let port = match get("PORT") {
            Some(p) => p.parse::<u16>().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let cors_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(str::trim).filter(|o| !o.is_empty()).map(String::from).collect())
            .unwrap_or_default();

        Ok(Self {
            project_id,
            location,
            credentials,
            catalog,
            defaults: GenerationDefaults::default(),
            api_base_url: get("VERTEX_API_BASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            port,
            cors_origins,
        })
    }

    /// Base URL of the regional Vertex AI endpoint.
    pub fn api_base(&self) -> String {
        match &self.api_base_url {
            Some(url) => url.clone(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        }
    }

    /// Full `generateContent` URL for a model.
    pub fn generate_content_url(&self, model: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.api_base(),
            self.project_id,
            self.location,
            model
        )
    }
}

fn validate_catalog(catalog: &ModelCatalog) -> Result<(), ConfigError> {
    if catalog.models.is_empty() {
        return Err(ConfigError::Invalid {
            name: "GEMINI_MODELS",
            reason: "model list is empty".to_string(),
        });
    }
    for (name, model) in [
        ("GEMINI_DEFAULT_MODEL", &catalog.default_model),
        ("GEMINI_ANALYSIS_MODEL", &catalog.analysis_model),
    ] {
        if !catalog.contains(model) {
            return Err(ConfigError::Invalid {
                name,
                reason: format!("'{}' is not in GEMINI_MODELS", model),
            });
        }
    }
    Ok(())
}
