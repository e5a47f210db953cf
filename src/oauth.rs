// gemini-mcp — Google service-account OAuth
// Mints a short-lived cloud-platform access token from a service-account key
// via the JWT bearer grant. One token per upstream call; nothing is cached.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::CredentialSource;
use crate::error::AuthError;
use crate::vertex::truncate_chars;

// ── Google OAuth 2.0 constants ───────────────────────────────────────────

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

/// The subset of a Google service-account key file we need.
#[derive(Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// A bearer token and the instant it stops being valid.
#[derive(Clone)]
pub struct Credentials {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl Credentials {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiry
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Turns the configured credential source into bearer tokens.
#[derive(Clone)]
pub struct CredentialProvider {
    source: CredentialSource,
    client: Client,
}

impl CredentialProvider {
    pub fn new(source: CredentialSource, client: Client) -> Self {
        Self { source, client }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self.source, CredentialSource::Missing)
    }

    /// Load the key, sign an assertion and exchange it for an access token.
    /// Every call performs a fresh exchange.
    pub async fn acquire_token(&self) -> Result<Credentials, AuthError> {
        let key = self.load_key().await?;
        let assertion = sign_assertion(&key, Utc::now())?;
        let credentials = exchange_assertion(&self.client, &key.token_uri, &assertion).await?;
        tracing::debug!(
            client_email = %key.client_email,
            expiry = %credentials.expiry,
            "service account token acquired"
        );
        Ok(credentials)
    }

    async fn load_key(&self) -> Result<ServiceAccountKey, AuthError> {
        match &self.source {
            CredentialSource::Inline(json) => Ok(serde_json::from_str(json)?),
            CredentialSource::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| AuthError::Read {
                        path: path.display().to_string(),
                        source,
                    })?;
                Ok(serde_json::from_str(&raw)?)
            }
            CredentialSource::Missing => Err(AuthError::NotConfigured),
        }
    }
}

/// Build and RS256-sign the JWT assertion for the token endpoint.
pub(crate) fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, AuthError> {
    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SCOPE,
        aud: &key.token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(AuthError::InvalidKey)?;
    jsonwebtoken::encode(&header, &claims, &encoding_key).map_err(AuthError::Sign)
}

async fn exchange_assertion(client: &Client, token_uri: &str, assertion: &str) -> Result<Credentials, AuthError> {
    let resp = client
        .post(token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
        .timeout(std::time::Duration::from_secs(TOKEN_REQUEST_TIMEOUT_SECS))
        .send()
        .await
        .map_err(AuthError::Transport)?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), "service account token exchange rejected");
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            body: truncate_chars(&body, 500),
        });
    }

    let token: GoogleTokenResponse = resp
        .json()
        .await
        .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
    if token.access_token.is_empty() {
        return Err(AuthError::MalformedResponse("empty access_token".to_string()));
    }

    let expires_in = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
    Ok(Credentials {
        token: token.access_token,
        expiry: expiry_after(Utc::now(), expires_in)?,
    })
}

/// `now + expires_in` seconds; negative or unrepresentable lifetimes are rejected.
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, AuthError> {
    if expires_in < 0 {
        return Err(AuthError::MalformedResponse(format!("negative expires_in: {}", expires_in)));
    }
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| AuthError::MalformedResponse(format!("expires_in out of range: {}", expires_in)))
}
