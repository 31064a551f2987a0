//! Client-specific error types
//!
//! `ClientError` covers the transport and token-exchange failure modes and
//! converts into `fab_foundation::Error`.

use crate::retry::{RetryClassification, RetryableError};
use fab_foundation::Error as FoundationError;
use thiserror::Error;

/// Errors that can occur while talking to the cloud APIs
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// Token exchange rejected the credential. Never retried.
    #[error("Authentication failed for {audience}: {message}")]
    Auth { audience: String, message: String },

    /// Request failed at the network level (connection, DNS, TLS).
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request hit the per-request timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response body could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl RetryableError for ClientError {
    fn classify(&self) -> RetryClassification {
        match self {
            // Network-level failures are transient - retry.
            ClientError::RequestFailed(_) | ClientError::Timeout(_) => RetryClassification::Retry,

            // Auth rejection is terminal; a malformed body won't improve.
            ClientError::Auth { .. } | ClientError::Parse(_) => RetryClassification::NoRetry,
        }
    }
}

// ============================================================================
// fab_foundation::Error conversion
// ============================================================================

impl From<ClientError> for FoundationError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Auth { audience, message } => FoundationError::Auth { audience, message },
            ClientError::RequestFailed(msg) => FoundationError::Http(msg),
            ClientError::Timeout(msg) => FoundationError::Http(format!("timeout: {msg}")),
            ClientError::Parse(msg) => FoundationError::Http(format!("parse: {msg}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert_eq!(
            ClientError::RequestFailed("conn refused".into()).classify(),
            RetryClassification::Retry
        );
        assert_eq!(
            ClientError::Timeout("30s".into()).classify(),
            RetryClassification::Retry
        );
        assert_eq!(
            ClientError::Auth {
                audience: "aud".into(),
                message: "denied".into()
            }
            .classify(),
            RetryClassification::NoRetry
        );
        assert_eq!(
            ClientError::Parse("bad json".into()).classify(),
            RetryClassification::NoRetry
        );
    }

    #[test]
    fn test_foundation_conversion_preserves_auth_fields() {
        let err = ClientError::Auth {
            audience: "https://api.fabric.microsoft.com".into(),
            message: "AADSTS700016".into(),
        };
        match FoundationError::from(err) {
            FoundationError::Auth { audience, message } => {
                assert_eq!(audience, "https://api.fabric.microsoft.com");
                assert_eq!(message, "AADSTS700016");
            }
            other => panic!("unexpected conversion: {other:?}"),
        }
    }
}
