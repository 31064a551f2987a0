//! Permission probing
//!
//! A probe is a single permission-check API call classified strictly by its
//! HTTP outcome. Read probes are always safe; write probes create
//! disposable resources that a best-effort cleanup pass removes.

mod engine;
mod outcome;
mod registry;
mod report;

pub use engine::{ProbeEngine, Surface};
pub use outcome::{classify, Outcome, ProbeResult};
pub use registry::{EphemeralRegistry, EphemeralResource, ResourceKind};
pub use report::{ProbeReport, ReportEntry, ReportFormat, Summary};
