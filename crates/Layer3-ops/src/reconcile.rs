//! Workspace reconciliation - find-or-create
//!
//! Reconciliation brings a remote workspace's *existence* in line with a
//! desired descriptor. It is strictly find-or-create, never
//! find-or-update: a pre-existing workspace is reused as-is even if it sits
//! on a different capacity. Deletion is a separate, explicit operation.

use fab_client::ApiClient;
use fab_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

// ============================================================================
// API Types
// ============================================================================

/// A workspace as the listing endpoint reports it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub capacity_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkspaceList {
    #[serde(default)]
    value: Vec<Workspace>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateWorkspaceRequest<'a> {
    display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity_id: Option<&'a str>,
}

// ============================================================================
// Reconciler
// ============================================================================

/// Find-or-create reconciler for workspaces
pub struct WorkspaceReconciler<'a> {
    api: &'a ApiClient,
}

impl<'a> WorkspaceReconciler<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Ensure a workspace named `name` exists and return its id.
    ///
    /// Issues at most one remote creation per invocation and is idempotent
    /// across repeated invocations with the same name.
    pub async fn reconcile(&self, name: &str, capacity_id: Option<&str>) -> Result<String> {
        if let Some(existing) = self.find(name).await? {
            if capacity_id.is_some() && existing.capacity_id.as_deref() != capacity_id {
                // Reused as-is: reconciliation never moves a workspace onto
                // a different capacity.
                info!(
                    name,
                    id = %existing.id,
                    requested_capacity = ?capacity_id,
                    actual_capacity = ?existing.capacity_id,
                    "workspace exists on a different capacity, reusing as-is"
                );
            } else {
                info!(name, id = %existing.id, "workspace already exists, reusing");
            }
            return Ok(existing.id);
        }
        self.create(name, capacity_id).await
    }

    /// Look up a workspace by exact display name. The first exact match is
    /// canonical if the listing somehow contains duplicates.
    pub async fn find(&self, name: &str) -> Result<Option<Workspace>> {
        let response = self.api.get("/workspaces").await?;
        if !response.is_success() {
            return Err(Error::Http(format!(
                "workspace listing failed: HTTP {}: {}",
                response.status, response.text
            )));
        }

        // Linear scan - workspace counts are tens, not millions.
        let list: WorkspaceList = serde_json::from_value(response.body)?;
        Ok(list.value.into_iter().find(|w| w.display_name == name))
    }

    async fn create(&self, name: &str, capacity_id: Option<&str>) -> Result<String> {
        debug!(name, ?capacity_id, "creating workspace");
        let body = serde_json::to_value(CreateWorkspaceRequest {
            display_name: name,
            capacity_id,
        })?;

        let response = self.api.post("/workspaces", body).await?;
        if !response.is_success() {
            return Err(Error::create(response.status, response.text));
        }

        match response.id() {
            Some(id) if !id.is_empty() => {
                info!(name, id, "created workspace");
                Ok(id.to_string())
            }
            // A 2xx without an id is a malformed success response.
            _ => Err(Error::create(
                response.status,
                "create response missing workspace id",
            )),
        }
    }

    /// Explicit deletion - the reconciler never does this on its own.
    pub async fn delete(&self, workspace_id: &str) -> Result<()> {
        let response = self
            .api
            .delete(&format!("/workspaces/{workspace_id}?forceDeletion=true"))
            .await?;
        if !response.is_success() {
            return Err(Error::Http(format!(
                "workspace delete failed: HTTP {}: {}",
                response.status, response.text
            )));
        }
        info!(workspace_id, "deleted workspace");
        Ok(())
    }

    /// Grant `role` on the workspace to a principal.
    pub async fn assign_role(
        &self,
        workspace_id: &str,
        principal_id: &str,
        principal_type: &str,
        role: &str,
    ) -> Result<()> {
        let body = json!({
            "principal": { "id": principal_id, "type": principal_type },
            "role": role,
        });
        let response = self
            .api
            .post(&format!("/workspaces/{workspace_id}/roleAssignments"), body)
            .await?;
        if !response.is_success() {
            return Err(Error::Http(format!(
                "role assignment failed: HTTP {}: {}",
                response.status, response.text
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_client, MockTransport};
    use fab_client::Method;
    use serde_json::json;

    const BASE: &str = "https://api.fabric.microsoft.com/v1";

    #[tokio::test]
    async fn test_reconcile_reuses_existing_workspace() {
        let transport = MockTransport::new();
        transport.on(
            Method::Get,
            "/workspaces",
            200,
            json!({ "value": [
                { "id": "w-1", "displayName": "vt-main", "capacityId": "cap-other" },
                { "id": "w-2", "displayName": "vt-dev" },
            ]}),
        );
        let api = mock_client(&transport, BASE);

        let id = WorkspaceReconciler::new(&api)
            .reconcile("vt-main", Some("cap-1"))
            .await
            .unwrap();

        // Reused as-is - no create, no capacity correction.
        assert_eq!(id, "w-1");
        assert_eq!(transport.count(Method::Post, "/workspaces"), 0);
    }

    #[tokio::test]
    async fn test_reconcile_creates_when_absent() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/workspaces", 200, json!({ "value": [] }));
        transport.on(
            Method::Post,
            "/workspaces",
            201,
            json!({ "id": "w-new", "displayName": "vt-feature-foo" }),
        );
        let api = mock_client(&transport, BASE);

        let id = WorkspaceReconciler::new(&api)
            .reconcile("vt-feature-foo", Some("cap-1"))
            .await
            .unwrap();

        assert_eq!(id, "w-new");
        assert_eq!(transport.count(Method::Post, "/workspaces"), 1);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent_across_invocations() {
        let transport = MockTransport::new();
        // First listing is empty; after creation the backend reports it.
        transport.on(Method::Get, "/workspaces", 200, json!({ "value": [] }));
        transport.on(
            Method::Get,
            "/workspaces",
            200,
            json!({ "value": [{ "id": "w-new", "displayName": "vt-main" }] }),
        );
        transport.on(Method::Post, "/workspaces", 201, json!({ "id": "w-new" }));
        let api = mock_client(&transport, BASE);
        let reconciler = WorkspaceReconciler::new(&api);

        let first = reconciler.reconcile("vt-main", None).await.unwrap();
        let second = reconciler.reconcile("vt-main", None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.count(Method::Post, "/workspaces"), 1);
    }

    #[tokio::test]
    async fn test_create_failure_is_fatal() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/workspaces", 200, json!({ "value": [] }));
        transport.on(
            Method::Post,
            "/workspaces",
            403,
            json!({ "message": "caller may not create workspaces" }),
        );
        let api = mock_client(&transport, BASE);

        let err = WorkspaceReconciler::new(&api)
            .reconcile("vt-main", None)
            .await
            .unwrap_err();

        match err {
            Error::Create { status, .. } => assert_eq!(status, 403),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_create_success_is_fatal() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/workspaces", 200, json!({ "value": [] }));
        transport.on(Method::Post, "/workspaces", 200, json!({}));
        let api = mock_client(&transport, BASE);

        let err = WorkspaceReconciler::new(&api)
            .reconcile("vt-main", None)
            .await
            .unwrap_err();

        match err {
            Error::Create { body, .. } => assert!(body.contains("missing workspace id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_returns_first_exact_match() {
        let transport = MockTransport::new();
        transport.on(
            Method::Get,
            "/workspaces",
            200,
            json!({ "value": [
                { "id": "w-prefix", "displayName": "vt-main-extra" },
                { "id": "w-first", "displayName": "vt-main" },
                { "id": "w-dup", "displayName": "vt-main" },
            ]}),
        );
        let api = mock_client(&transport, BASE);

        let found = WorkspaceReconciler::new(&api)
            .find("vt-main")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "w-first");
    }
}
