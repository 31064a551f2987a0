//! Error types for FabOps
//!
//! One central taxonomy; the client layer defines its own error enum and
//! converts into this one.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// FabOps error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // Provisioning
    // ========================================================================
    /// Token exchange failed - terminal for the whole run.
    #[error("Authentication failed for {audience}: {message}")]
    Auth { audience: String, message: String },

    /// Resource creation returned non-2xx, or a 2xx body without an id.
    #[error("Create failed (HTTP {status}): {body}")]
    Create { status: u16, body: String },

    /// Git connect failed with something other than "already connected".
    #[error("Git connect failed (HTTP {status}): {body}")]
    GitLink { status: u16, body: String },

    // ========================================================================
    // General
    // ========================================================================
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // External error conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Other
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Auth error constructor helper
    pub fn auth(audience: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Auth {
            audience: audience.into(),
            message: message.into(),
        }
    }

    /// Create error constructor helper
    pub fn create(status: u16, body: impl Into<String>) -> Self {
        Error::Create {
            status,
            body: body.into(),
        }
    }

    /// Git-link error constructor helper
    pub fn git_link(status: u16, body: impl Into<String>) -> Self {
        Error::GitLink {
            status,
            body: body.into(),
        }
    }
}

// ============================================================================
// From implementations (extra conversions)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers_build_the_right_variants() {
        assert!(matches!(Error::auth("aud", "bad secret"), Error::Auth { .. }));
        assert!(matches!(Error::create(500, "boom"), Error::Create { status: 500, .. }));
        assert!(matches!(Error::git_link(409, "conflict"), Error::GitLink { status: 409, .. }));
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::auth("https://api.fabric.microsoft.com", "AADSTS7000215");
        let text = err.to_string();
        assert!(text.contains("api.fabric.microsoft.com"));
        assert!(text.contains("AADSTS7000215"));
    }
}
