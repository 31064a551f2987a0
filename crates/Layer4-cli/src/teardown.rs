//! `fabops teardown` - disconnect git and delete a workspace

use crate::context::AppContext;
use anyhow::bail;
use clap::Args;
use fab_foundation::FabConfig;
use fab_ops::{gitlink, WorkspaceReconciler};
use tracing::warn;

#[derive(Args, Debug)]
pub struct TeardownArgs {
    /// Workspace display name to tear down
    #[arg(long, conflicts_with = "workspace_id", required_unless_present = "workspace_id")]
    name: Option<String>,

    /// Workspace id to tear down
    #[arg(long)]
    workspace_id: Option<String>,

    /// Skip the git disconnect step
    #[arg(long)]
    keep_git: bool,
}

pub async fn run(config: &FabConfig, args: TeardownArgs) -> anyhow::Result<()> {
    let ctx = AppContext::new(config)?;
    let api = ctx.fabric_client().await?;
    let reconciler = WorkspaceReconciler::new(&api);

    let workspace_id = match (&args.workspace_id, &args.name) {
        (Some(id), _) => id.clone(),
        (None, Some(name)) => match reconciler.find(name).await? {
            Some(workspace) => workspace.id,
            None => bail!("no workspace named '{name}'"),
        },
        (None, None) => bail!("either --name or --workspace-id is required"),
    };

    if !args.keep_git {
        // Best-effort: a workspace that was never connected is fine, and a
        // failed disconnect must not block the delete.
        if let Err(e) = gitlink::disconnect(&api, &workspace_id).await {
            warn!(workspace_id = %workspace_id, error = %e, "git disconnect failed, continuing");
        }
    }

    reconciler.delete(&workspace_id).await?;
    println!("workspace_id={workspace_id}");
    Ok(())
}
