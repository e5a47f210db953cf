// gemini-mcp - Application state

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::mcp::tools::ToolRegistry;
use crate::oauth::CredentialProvider;
use crate::vertex::{build_http_client, VertexClient};

/// Central application state. Immutable after startup; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub vertex: VertexClient,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let client = build_http_client()?;
        let credentials = CredentialProvider::new(config.credentials.clone(), client.clone());

        if credentials.is_configured() {
            tracing::info!(project = %config.project_id, location = %config.location, "credentials configured");
        } else {
            tracing::warn!("no Google credentials configured; upstream calls will fail");
        }

        let tools = Arc::new(ToolRegistry::new(&config.catalog));
        tracing::info!(
            "AppState initialised: {} models, default {}, {} tools",
            config.catalog.models.len(),
            config.catalog.default_model,
            tools.descriptors().len()
        );

        Ok(Self {
            vertex: VertexClient::new(client, config.clone(), credentials),
            config,
            tools,
        })
    }
}
