//! `fabops probe` - check what the current credential may do

use crate::context::AppContext;
use clap::Args;
use fab_foundation::FabConfig;
use fab_ops::{ProbeEngine, ReportFormat};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Also run write probes (creates disposable resources)
    #[arg(long)]
    write: bool,

    /// Leave created resources in place for manual inspection
    #[arg(long)]
    no_cleanup: bool,

    /// Report output format
    #[arg(long, default_value_t = ReportFormat::Table)]
    format: ReportFormat,
}

pub async fn run(config: &FabConfig, args: ProbeArgs) -> anyhow::Result<()> {
    let ctx = AppContext::new(config)?;
    // Token exchange failure aborts probing entirely.
    let fabric = ctx.fabric_client().await?;
    let analytics = ctx.analytics_client().await?;

    let mut engine = ProbeEngine::new(fabric, analytics);
    engine.run_read_probes().await;
    if args.write {
        engine.run_write_probes().await;
    }

    if args.no_cleanup {
        for resource in engine.registry().resources() {
            warn!(
                kind = resource.kind.as_str(),
                id = %resource.id,
                "cleanup disabled, delete this resource manually"
            );
        }
    } else {
        engine.cleanup().await;
    }

    let report = engine.report();
    info!(
        allowed = report.summary.allowed,
        denied = report.summary.denied,
        errors = report.summary.errors,
        total = report.summary.total,
        "probe run complete"
    );
    print!("{}", report.render(args.format));
    Ok(())
}
