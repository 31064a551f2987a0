//! Token provider - client-credentials grant against the identity provider
//!
//! Distinct APIs require bearer tokens scoped to distinct resource
//! audiences. Tokens are cached per audience for the process lifetime.

use crate::error::ClientError;
use fab_foundation::Credential;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use tracing::debug;

/// Audience for the workspace (Fabric) API
pub const AUDIENCE_FABRIC: &str = "https://api.fabric.microsoft.com";
/// Audience for the legacy analytics (Power BI) API
pub const AUDIENCE_ANALYTICS: &str = "https://analysis.windows.net/powerbi/api";

const TOKEN_ENDPOINT_BASE: &str = "https://login.microsoftonline.com";

/// A bearer token scoped to one audience
#[derive(Clone)]
pub struct AccessToken {
    pub audience: String,
    value: String,
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(audience: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            value: value.into(),
            expires_in: None,
        }
    }

    /// The raw bearer value. Only the transport should need this.
    pub fn secret(&self) -> &str {
        &self.value
    }
}

// Token values must never reach logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("audience", &self.audience)
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Exchanges a service-principal credential for audience-scoped tokens
pub struct TokenProvider {
    http: reqwest::Client,
    credential: Credential,
    cache: Mutex<HashMap<String, AccessToken>>,
}

impl TokenProvider {
    pub fn new(credential: Credential) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Get a bearer token for `audience`, minting one on first use.
    ///
    /// Auth failure is terminal - there is no retry. Failures for one
    /// audience do not poison the cache for another.
    pub async fn get_token(&self, audience: &str) -> Result<AccessToken, ClientError> {
        if let Some(token) = self.cache.lock().unwrap().get(audience) {
            return Ok(token.clone());
        }

        let url = format!(
            "{TOKEN_ENDPOINT_BASE}/{}/oauth2/v2.0/token",
            self.credential.tenant_id
        );
        let scope = format!("{audience}/.default");
        let params = [
            ("client_id", self.credential.client_id.as_str()),
            ("client_secret", self.credential.client_secret.as_str()),
            ("scope", scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        // A non-JSON body falls through to the "Unknown error" path below.
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let token = parse_token_response(audience, &body)?;

        debug!(audience, "minted access token");
        self.cache
            .lock()
            .unwrap()
            .insert(audience.to_string(), token.clone());
        Ok(token)
    }
}

/// Extract the token from an identity-provider response, or the most useful
/// error message the provider gave us.
fn parse_token_response(audience: &str, body: &Value) -> Result<AccessToken, ClientError> {
    if let Some(value) = body.get("access_token").and_then(Value::as_str) {
        return Ok(AccessToken {
            audience: audience.to_string(),
            value: value.to_string(),
            expires_in: body.get("expires_in").and_then(Value::as_u64),
        });
    }

    let message = body
        .get("error_description")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or("Unknown error")
        .to_string();

    Err(ClientError::Auth {
        audience: audience.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_token_success() {
        let body = json!({ "access_token": "tok-123", "expires_in": 3599 });
        let token = parse_token_response(AUDIENCE_FABRIC, &body).unwrap();
        assert_eq!(token.secret(), "tok-123");
        assert_eq!(token.audience, AUDIENCE_FABRIC);
        assert_eq!(token.expires_in, Some(3599));
    }

    #[test]
    fn test_parse_token_error_description_preferred() {
        let body = json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        });
        let err = parse_token_response(AUDIENCE_FABRIC, &body).unwrap_err();
        match err {
            ClientError::Auth { audience, message } => {
                assert_eq!(audience, AUDIENCE_FABRIC);
                assert!(message.starts_with("AADSTS7000215"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_token_bare_error_field() {
        let body = json!({ "error": "invalid_client" });
        let err = parse_token_response(AUDIENCE_ANALYTICS, &body).unwrap_err();
        assert!(err.to_string().contains("invalid_client"));
    }

    #[test]
    fn test_parse_token_empty_body_gives_unknown_error() {
        let err = parse_token_response(AUDIENCE_FABRIC, &Value::Null).unwrap_err();
        assert!(err.to_string().contains("Unknown error"));
    }

    #[test]
    fn test_token_debug_redacts_value() {
        let token = AccessToken::new(AUDIENCE_FABRIC, "super-secret-bearer");
        let dump = format!("{token:?}");
        assert!(!dump.contains("super-secret-bearer"));
    }
}
