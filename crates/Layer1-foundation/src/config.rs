//! Explicit configuration for FabOps
//!
//! The shell predecessor read everything from global environment variables.
//! Components here receive an explicit struct instead; `validate` fails fast
//! on the first missing mandatory field.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Service-principal credential. Used once per audience to mint a token,
/// never persisted.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

// The secret must never reach logs, including debug-formatted config dumps.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Source-control binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSettings {
    pub owner: String,
    pub repo_name: String,
    pub branch: String,
    pub directory: String,
    pub connection_id: String,
}

/// FabOps configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabConfig {
    pub credential: Credential,

    /// Capacity to place newly created workspaces on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_id: Option<String>,

    /// Prefix for derived workspace names
    #[serde(default = "default_prefix")]
    pub workspace_prefix: String,

    /// Branch name folded into derived workspace names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Git binding, when provisioning should connect the workspace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSettings>,
}

impl FabConfig {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            capacity_id: None,
            workspace_prefix: default_prefix(),
            branch: None,
            git: None,
        }
    }

    /// Read configuration from the environment. `FABOPS_*` wins over the
    /// conventional `AZURE_*` names.
    pub fn from_env() -> Self {
        Self {
            credential: Credential {
                tenant_id: env_any(&["FABOPS_TENANT_ID", "AZURE_TENANT_ID"]),
                client_id: env_any(&["FABOPS_CLIENT_ID", "AZURE_CLIENT_ID"]),
                client_secret: env_any(&["FABOPS_CLIENT_SECRET", "AZURE_CLIENT_SECRET"]),
            },
            capacity_id: env_opt("FABOPS_CAPACITY_ID"),
            workspace_prefix: env_opt("FABOPS_WORKSPACE_PREFIX").unwrap_or_else(default_prefix),
            branch: env_opt("FABOPS_BRANCH"),
            git: None,
        }
    }

    /// Fail fast if a mandatory field is absent.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("tenant id (FABOPS_TENANT_ID)", &self.credential.tenant_id),
            ("client id (FABOPS_CLIENT_ID)", &self.credential.client_id),
            (
                "client secret (FABOPS_CLIENT_SECRET)",
                &self.credential.client_secret,
            ),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(Error::Config(format!("missing {field}")));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn capacity_id(mut self, id: impl Into<String>) -> Self {
        self.capacity_id = Some(id.into());
        self
    }

    pub fn workspace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.workspace_prefix = prefix.into();
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn git(mut self, git: GitSettings) -> Self {
        self.git = Some(git);
        self
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn env_any(names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.is_empty()))
        .unwrap_or_default()
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn default_prefix() -> String {
    "ws".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_credential() -> Credential {
        Credential::new("tenant", "client", "secret")
    }

    #[test]
    fn test_validate_ok() {
        let config = FabConfig::new(full_credential());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_fails_fast_on_missing_tenant() {
        let config = FabConfig::new(Credential::new("", "client", "secret"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("tenant"));
    }

    #[test]
    fn test_validate_fails_on_missing_secret() {
        let config = FabConfig::new(Credential::new("tenant", "client", ""));
        assert!(config.validate().unwrap_err().to_string().contains("secret"));
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let config = FabConfig::new(Credential::new("tenant", "client", "hunter2-value"));
        let dump = format!("{config:?}");
        assert!(!dump.contains("hunter2-value"));
        assert!(dump.contains("<redacted>"));
    }

    #[test]
    fn test_builder() {
        let config = FabConfig::new(full_credential())
            .capacity_id("cap-1")
            .workspace_prefix("vt")
            .branch("feature/foo");

        assert_eq!(config.capacity_id.as_deref(), Some("cap-1"));
        assert_eq!(config.workspace_prefix, "vt");
        assert_eq!(config.branch.as_deref(), Some("feature/foo"));
    }
}
