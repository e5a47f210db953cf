// ---------------------------------------------------------------------------
// error.rs — error taxonomy for configuration, auth, upstream calls, params
// ---------------------------------------------------------------------------

/// Startup configuration problems. Fatal; surfaced from `main` via anyhow.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Failure to obtain a bearer token for the upstream API.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no credentials configured")]
    NotConfigured,

    #[error("failed to read credentials file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service account JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid service account private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token assertion: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("token request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    #[error("access token expired before use (expiry {0})")]
    Expired(chrono::DateTime<chrono::Utc>),
}

/// Any failure between "we decided to call Vertex" and "we have text".
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("API error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("no text in response ({0})")]
    MissingText(String),
}

/// Rejected tool / endpoint parameters. Raised before any outbound call.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamError {
    #[error("unknown model '{model}' (available: {available})")]
    UnknownModel { model: String, available: String },

    #[error("max_tokens must be a positive integer, got {0}")]
    InvalidMaxTokens(i64),

    #[error("temperature must be within [0, 2], got {0}")]
    InvalidTemperature(f64),

    #[error("{0}")]
    Malformed(String),
}
