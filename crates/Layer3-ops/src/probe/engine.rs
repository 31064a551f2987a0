//! Probe engine - runs the battery and tracks ephemeral resources
//!
//! Probes run sequentially; each one blocks on its network call. A single
//! probe's failure is recorded, never propagated - only authentication
//! failure (which happens before the engine exists) aborts a run.

use super::outcome::{classify, Outcome, ProbeResult};
use super::registry::{EphemeralRegistry, ResourceKind};
use super::report::ProbeReport;
use chrono::Utc;
use fab_client::{ApiClient, ApiResponse, Method};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Which API surface a probe targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Workspace (Fabric) API
    Fabric,
    /// Legacy analytics (Power BI) API
    Analytics,
}

/// Runs permission probes against both API surfaces
pub struct ProbeEngine {
    fabric: ApiClient,
    analytics: ApiClient,
    results: HashMap<String, ProbeResult>,
    registry: EphemeralRegistry,
    run_prefix: String,
}

impl ProbeEngine {
    pub fn new(fabric: ApiClient, analytics: ApiClient) -> Self {
        // Time-derived prefix keeps concurrent runs from colliding on
        // resource names.
        let run_prefix = format!("permprobe-{}", Utc::now().format("%Y%m%d%H%M%S"));
        Self {
            fabric,
            analytics,
            results: HashMap::new(),
            registry: EphemeralRegistry::new(),
            run_prefix,
        }
    }

    fn api(&self, surface: Surface) -> &ApiClient {
        match surface {
            Surface::Fabric => &self.fabric,
            Surface::Analytics => &self.analytics,
        }
    }

    /// Issue one probe and record its classified outcome. Transport
    /// failures are recorded as ERROR and never abort the batch.
    async fn run_probe(
        &mut self,
        name: &str,
        surface: Surface,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Option<ApiResponse> {
        let api = self.api(surface);
        let sent = match method {
            Method::Get => api.get(path).await,
            Method::Post => api.post(path, body.unwrap_or_else(|| json!({}))).await,
            Method::Delete => api.delete(path).await,
        };

        match sent {
            Ok(response) => {
                let result = classify(&response);
                debug!(probe = name, outcome = %result.outcome, "probe classified");
                self.results.insert(name.to_string(), result);
                Some(response)
            }
            Err(e) => {
                warn!(probe = name, error = %e, "probe request failed");
                self.results
                    .insert(name.to_string(), ProbeResult::new(Outcome::Error, e.to_string()));
                None
            }
        }
    }

    /// Read-only battery - always safe to run.
    pub async fn run_read_probes(&mut self) {
        self.run_probe("list_workspaces", Surface::Fabric, Method::Get, "/workspaces", None)
            .await;
        self.run_probe("list_capacities", Surface::Fabric, Method::Get, "/capacities", None)
            .await;
        self.run_probe(
            "admin_list_workspaces",
            Surface::Fabric,
            Method::Get,
            "/admin/workspaces",
            None,
        )
        .await;
        self.run_probe("list_groups", Surface::Analytics, Method::Get, "/groups", None)
            .await;
        self.run_probe("list_datasets", Surface::Analytics, Method::Get, "/datasets", None)
            .await;
        self.run_probe(
            "admin_list_groups",
            Surface::Analytics,
            Method::Get,
            "/admin/groups?$top=1",
            None,
        )
        .await;
    }

    /// Write battery - creates disposable resources. Explicit opt-in.
    ///
    /// A dependent probe only runs when its prerequisite create succeeded;
    /// otherwise it is skipped, not recorded as a failure.
    pub async fn run_write_probes(&mut self) {
        // Workspace API: workspace, then an item inside it.
        let ws_name = format!("{}-ws", self.run_prefix);
        let response = self
            .run_probe(
                "create_workspace",
                Surface::Fabric,
                Method::Post,
                "/workspaces",
                Some(json!({ "displayName": ws_name })),
            )
            .await;
        let workspace_id = created_id(response);
        if let Some(id) = &workspace_id {
            // Registered before anything else can fail, so cleanup always
            // finds it.
            self.registry.register(ResourceKind::Workspace, id.clone(), None);
        }

        match &workspace_id {
            Some(ws_id) => {
                let item_name = format!("{}-notebook", self.run_prefix);
                let path = format!("/workspaces/{ws_id}/items");
                let response = self
                    .run_probe(
                        "create_item",
                        Surface::Fabric,
                        Method::Post,
                        &path,
                        Some(json!({ "displayName": item_name, "type": "Notebook" })),
                    )
                    .await;
                if let Some(item_id) = created_id(response) {
                    self.registry
                        .register(ResourceKind::Item, item_id, Some(ws_id.clone()));
                }
            }
            None => debug!("create_workspace did not succeed, skipping dependent item probe"),
        }

        // Analytics API: group, then a push dataset inside it.
        let group_name = format!("{}-grp", self.run_prefix);
        let response = self
            .run_probe(
                "create_group",
                Surface::Analytics,
                Method::Post,
                "/groups",
                Some(json!({ "name": group_name })),
            )
            .await;
        let group_id = created_id(response);
        if let Some(id) = &group_id {
            self.registry.register(ResourceKind::Group, id.clone(), None);
        }

        match &group_id {
            Some(group_id) => {
                let dataset_name = format!("{}-ds", self.run_prefix);
                let path = format!("/groups/{group_id}/datasets");
                let response = self
                    .run_probe(
                        "create_dataset",
                        Surface::Analytics,
                        Method::Post,
                        &path,
                        Some(json!({
                            "name": dataset_name,
                            "defaultMode": "Push",
                            "tables": [],
                        })),
                    )
                    .await;
                if let Some(dataset_id) = created_id(response) {
                    self.registry
                        .register(ResourceKind::Dataset, dataset_id, Some(group_id.clone()));
                }
            }
            None => debug!("create_group did not succeed, skipping dependent dataset probe"),
        }
    }

    /// Best-effort cleanup in dependency order. A failed delete is a
    /// warning, never fatal, and never masks the probe verdicts.
    pub async fn cleanup(&mut self) {
        for resource in self.registry.drain_in_cleanup_order() {
            let parent = resource.parent_id.as_deref().unwrap_or_default();
            let (surface, path) = match resource.kind {
                ResourceKind::Item => (
                    Surface::Fabric,
                    format!("/workspaces/{parent}/items/{}", resource.id),
                ),
                ResourceKind::Dataset => (
                    Surface::Analytics,
                    format!("/groups/{parent}/datasets/{}", resource.id),
                ),
                ResourceKind::Workspace => (
                    Surface::Fabric,
                    format!("/workspaces/{}?forceDeletion=true", resource.id),
                ),
                ResourceKind::Group => (Surface::Analytics, format!("/groups/{}", resource.id)),
            };

            match self.api(surface).delete(&path).await {
                Ok(r) if r.is_success() => {
                    debug!(kind = resource.kind.as_str(), id = %resource.id, "deleted ephemeral resource");
                }
                Ok(r) => {
                    warn!(
                        kind = resource.kind.as_str(),
                        id = %resource.id,
                        status = r.status,
                        "failed to delete ephemeral resource"
                    );
                }
                Err(e) => {
                    warn!(
                        kind = resource.kind.as_str(),
                        id = %resource.id,
                        error = %e,
                        "failed to delete ephemeral resource"
                    );
                }
            }
        }
    }

    /// Resources still awaiting deletion - surfaced when cleanup is
    /// disabled so a human can dispose of them.
    pub fn registry(&self) -> &EphemeralRegistry {
        &self.registry
    }

    pub fn results(&self) -> &HashMap<String, ProbeResult> {
        &self.results
    }

    pub fn report(&self) -> ProbeReport {
        ProbeReport::from_results(&self.results)
    }
}

fn created_id(response: Option<ApiResponse>) -> Option<String> {
    response
        .filter(ApiResponse::is_success)
        .and_then(|r| r.id().map(str::to_string))
        .filter(|id| !id.is_empty())
}
