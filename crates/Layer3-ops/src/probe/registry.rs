//! Ephemeral-resource registry
//!
//! Every resource created while probing write permissions is recorded here
//! immediately after its create call succeeds, before any later step can
//! fail. Cleanup drains the registry in dependency order.

use tracing::debug;

/// Kind of disposable resource created while probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Workspace on the workspace (Fabric) API
    Workspace,
    /// Item (notebook, lakehouse, ...) inside a workspace
    Item,
    /// Group on the legacy analytics API
    Group,
    /// Dataset inside a group
    Dataset,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Workspace => "workspace",
            ResourceKind::Item => "item",
            ResourceKind::Group => "group",
            ResourceKind::Dataset => "dataset",
        }
    }

    /// Children delete before the containers that hold them.
    fn cleanup_rank(&self) -> u8 {
        match self {
            ResourceKind::Item | ResourceKind::Dataset => 0,
            ResourceKind::Workspace | ResourceKind::Group => 1,
        }
    }
}

/// One resource created during write probing
#[derive(Debug, Clone)]
pub struct EphemeralResource {
    pub kind: ResourceKind,
    pub id: String,
    /// Containing workspace/group, for kinds that live inside one
    pub parent_id: Option<String>,
}

/// Registry of resources awaiting cleanup
#[derive(Debug, Default)]
pub struct EphemeralRegistry {
    resources: Vec<EphemeralResource>,
}

impl EphemeralRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ResourceKind, id: impl Into<String>, parent_id: Option<String>) {
        let id = id.into();
        debug!(kind = kind.as_str(), id, "registered ephemeral resource");
        self.resources.push(EphemeralResource {
            kind,
            id,
            parent_id,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resources(&self) -> &[EphemeralResource] {
        &self.resources
    }

    /// Remove and return everything, children first, registration order
    /// preserved within each rank.
    pub fn drain_in_cleanup_order(&mut self) -> Vec<EphemeralResource> {
        let mut drained = std::mem::take(&mut self.resources);
        // sort_by_key is stable, so same-rank entries keep their order.
        drained.sort_by_key(|r| r.kind.cleanup_rank());
        drained
    }
}
