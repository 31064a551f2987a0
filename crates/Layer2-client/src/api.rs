//! Authorized client for one API surface
//!
//! Each surface (workspace API, legacy analytics API) gets its own
//! `ApiClient` carrying the base URL and an audience-scoped token.

use crate::error::ClientError;
use crate::token::AccessToken;
use crate::transport::{ApiRequest, ApiResponse, ApiTransport, Method};
use serde_json::Value;
use std::sync::Arc;

/// Workspace (Fabric) API base
pub const FABRIC_API_BASE: &str = "https://api.fabric.microsoft.com/v1";
/// Legacy analytics (Power BI) API base
pub const ANALYTICS_API_BASE: &str = "https://api.powerbi.com/v1.0/myorg";

/// One base URL, one token, one transport
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
    base_url: String,
    token: AccessToken,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        base_url: impl Into<String>,
        token: AccessToken,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            token,
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.send(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, ClientError> {
        self.send(Method::Post, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.send(Method::Delete, path, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ClientError> {
        let request = ApiRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            body,
            bearer: self.token.secret().to_string(),
        };
        self.transport.send(&request).await
    }
}
