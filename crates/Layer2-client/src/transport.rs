//! HTTP transport - the seam between lifecycle logic and the network
//!
//! Everything above this layer works with `(status, parsed body)` pairs;
//! the `ApiTransport` trait lets tests substitute the network entirely.

use crate::error::ClientError;
use crate::retry::{with_retry, RetryConfig};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout. The shell predecessor had none and could hang
/// indefinitely on a stalled connection.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP methods the lifecycle operations use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// One authenticated API request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub bearer: String,
}

/// Status code plus parsed body. Non-JSON bodies parse to `Value::Null`;
/// the raw text is kept for error reporting.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
    pub text: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error code from either the flat `errorCode` shape or the nested
    /// `error.code` shape - the APIs use both.
    pub fn error_code(&self) -> Option<&str> {
        self.body
            .get("errorCode")
            .and_then(Value::as_str)
            .or_else(|| {
                self.body
                    .get("error")
                    .and_then(|e| e.get("code"))
                    .and_then(Value::as_str)
            })
    }

    /// Human-readable error message, from either error shape.
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| {
                self.body
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
            })
    }

    /// Number of entries in a `value` array listing, if the body has one.
    pub fn value_count(&self) -> Option<usize> {
        self.body.get("value").and_then(Value::as_array).map(Vec::len)
    }

    /// The `id` field of a created resource, if present.
    pub fn id(&self) -> Option<&str> {
        self.body.get("id").and_then(Value::as_str)
    }
}

/// The network seam. Implemented by `HttpTransport` in production and by a
/// mock in tests.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// reqwest-backed transport with per-request timeout and retry on
/// network-level failures only. HTTP statuses always pass through so the
/// caller can classify them.
pub struct HttpTransport {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            retry: RetryConfig::default(),
        })
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };
        builder = builder.bearer_auth(&request.bearer);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(e.to_string())
            } else {
                ClientError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        debug!(status, url = %request.url, "api response");
        Ok(ApiResponse { status, body, text })
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        with_retry(&self.retry, request.method.as_str(), || {
            self.send_once(request)
        })
        .await
    }
}
