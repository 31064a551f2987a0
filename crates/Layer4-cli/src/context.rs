//! Shared command context: configuration and authenticated API clients

use fab_client::{
    ApiClient, ApiTransport, HttpTransport, TokenProvider, ANALYTICS_API_BASE, AUDIENCE_ANALYTICS,
    AUDIENCE_FABRIC, FABRIC_API_BASE,
};
use fab_foundation::FabConfig;
use std::sync::Arc;

/// Configuration from the environment with command-line overrides applied.
pub fn build_config(
    tenant_id: Option<&str>,
    client_id: Option<&str>,
    client_secret: Option<&str>,
) -> FabConfig {
    let mut config = FabConfig::from_env();
    if let Some(tenant_id) = tenant_id {
        config.credential.tenant_id = tenant_id.to_string();
    }
    if let Some(client_id) = client_id {
        config.credential.client_id = client_id.to_string();
    }
    if let Some(client_secret) = client_secret {
        config.credential.client_secret = client_secret.to_string();
    }
    config
}

/// Holds the transport and token provider shared by a command's clients.
pub struct AppContext {
    transport: Arc<HttpTransport>,
    tokens: TokenProvider,
}

impl AppContext {
    /// Validates the configuration before any network call is made.
    pub fn new(config: &FabConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            transport: Arc::new(HttpTransport::new()?),
            tokens: TokenProvider::new(config.credential.clone()),
        })
    }

    /// Client for the workspace (Fabric) API. Token exchange failure here
    /// is fatal to the whole invocation.
    pub async fn fabric_client(&self) -> anyhow::Result<ApiClient> {
        let token = self.tokens.get_token(AUDIENCE_FABRIC).await?;
        Ok(ApiClient::new(
            self.transport.clone() as Arc<dyn ApiTransport>,
            FABRIC_API_BASE,
            token,
        ))
    }

    /// Client for the legacy analytics (Power BI) API.
    pub async fn analytics_client(&self) -> anyhow::Result<ApiClient> {
        let token = self.tokens.get_token(AUDIENCE_ANALYTICS).await?;
        Ok(ApiClient::new(
            self.transport.clone() as Arc<dyn ApiTransport>,
            ANALYTICS_API_BASE,
            token,
        ))
    }
}
