//! Authenticated REST client layer for FabOps
//!
//! - `token` - service-principal token exchange, cached per audience
//! - `transport` - the HTTP seam: request/response types and the
//!   `ApiTransport` trait with its reqwest implementation
//! - `api` - authorized client for one API surface (base URL + token)
//! - `retry` - exponential backoff for transient network failures

pub mod api;
pub mod error;
pub mod retry;
pub mod token;
pub mod transport;

pub use api::{ApiClient, ANALYTICS_API_BASE, FABRIC_API_BASE};
pub use error::ClientError;
pub use retry::{with_retry, RetryConfig};
pub use token::{AccessToken, TokenProvider, AUDIENCE_ANALYTICS, AUDIENCE_FABRIC};
pub use transport::{ApiRequest, ApiResponse, ApiTransport, HttpTransport, Method};
