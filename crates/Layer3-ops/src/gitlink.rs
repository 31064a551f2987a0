//! Git-link reconciliation - idempotent "ensure binding"
//!
//! Connecting a workspace to Git either succeeds, is already done (a
//! conflict we treat as success), or genuinely fails. Conflicts with any
//! other cause stay fatal.

use fab_client::{ApiClient, ApiResponse};
use fab_foundation::{Error, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Error codes the connect endpoint returns when the binding is already in
/// place. These are idempotent no-ops, not failures.
pub const ALREADY_CONNECTED_CODES: [&str; 3] = [
    "WorkspaceAlreadyConnectedToGit",
    "GitIntegrationAlreadyConnected",
    "GitConnectionAlreadyExists",
];

const NOT_CONNECTED_CODE: &str = "WorkspaceNotConnectedToGit";

/// The source-control binding to attach to a workspace
#[derive(Debug, Clone)]
pub struct GitBinding {
    pub provider: String,
    pub owner: String,
    pub repo_name: String,
    pub branch: String,
    pub directory: String,
    pub connection_id: String,
}

impl GitBinding {
    pub fn github(
        owner: impl Into<String>,
        repo_name: impl Into<String>,
        branch: impl Into<String>,
        directory: impl Into<String>,
        connection_id: impl Into<String>,
    ) -> Self {
        Self {
            provider: "GitHub".to_string(),
            owner: owner.into(),
            repo_name: repo_name.into(),
            branch: branch.into(),
            directory: directory.into(),
            connection_id: connection_id.into(),
        }
    }
}

fn connect_body(binding: &GitBinding) -> Value {
    json!({
        "gitProviderDetails": {
            "gitProviderType": binding.provider,
            "ownerName": binding.owner,
            "repositoryName": binding.repo_name,
            "branchName": binding.branch,
            "directoryName": binding.directory,
        },
        "myGitCredentials": {
            "source": "ConfiguredConnection",
            "connectionId": binding.connection_id,
        },
    })
}

/// Result of a connect attempt that the caller treats as success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitLinkOutcome {
    /// The binding was created by this call
    Connected,
    /// The binding already existed - idempotent no-op
    AlreadyConnected,
}

enum ConnectClass {
    Connected,
    AlreadyConnected,
    Failed,
}

fn classify_connect(response: &ApiResponse) -> ConnectClass {
    if response.is_success() {
        return ConnectClass::Connected;
    }
    match response.error_code() {
        Some(code) if ALREADY_CONNECTED_CODES.contains(&code) => ConnectClass::AlreadyConnected,
        // Unknown code, or an empty/unparseable body: hard failure.
        _ => ConnectClass::Failed,
    }
}

/// Attach a git binding to the workspace.
pub async fn connect(
    api: &ApiClient,
    workspace_id: &str,
    binding: &GitBinding,
) -> Result<GitLinkOutcome> {
    let response = api
        .post(
            &format!("/workspaces/{workspace_id}/git/connect"),
            connect_body(binding),
        )
        .await?;

    match classify_connect(&response) {
        ConnectClass::Connected => {
            info!(
                workspace_id,
                repo = %binding.repo_name,
                branch = %binding.branch,
                "connected workspace to git"
            );
            Ok(GitLinkOutcome::Connected)
        }
        ConnectClass::AlreadyConnected => {
            warn!(workspace_id, "workspace already connected to git, skipping");
            Ok(GitLinkOutcome::AlreadyConnected)
        }
        ConnectClass::Failed => Err(Error::git_link(response.status, response.text)),
    }
}

/// Detach the git binding. Not-connected is fine; anything else is an error
/// the caller may choose to treat as best-effort.
pub async fn disconnect(api: &ApiClient, workspace_id: &str) -> Result<()> {
    let response = api
        .post(&format!("/workspaces/{workspace_id}/git/disconnect"), json!({}))
        .await?;

    if response.is_success() || response.error_code() == Some(NOT_CONNECTED_CODE) {
        info!(workspace_id, "git disconnected");
        return Ok(());
    }
    Err(Error::git_link(response.status, response.text))
}
