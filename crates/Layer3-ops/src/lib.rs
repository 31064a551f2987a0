//! Lifecycle operations for FabOps
//!
//! - `reconcile` - find-or-create workspace reconciliation
//! - `gitlink` - idempotent git-connection binding
//! - `probe` - permission probing, ephemeral resources, report rendering
//! - `varlib` - the persisted variable-library document
//! - `propagate` - CI variable/secret propagation contract

pub mod gitlink;
pub mod probe;
pub mod propagate;
pub mod reconcile;
pub mod varlib;

#[cfg(test)]
pub(crate) mod testing;

pub use gitlink::{GitBinding, GitLinkOutcome};
pub use probe::{
    EphemeralRegistry, EphemeralResource, Outcome, ProbeEngine, ProbeReport, ProbeResult,
    ReportFormat, ResourceKind,
};
pub use propagate::{EnvFilePropagator, VariablePropagator};
pub use reconcile::{Workspace, WorkspaceReconciler};
pub use varlib::{VariableEntry, VariableLibrary};
