//! `fabops provision` - find-or-create a workspace and bind it to git

use crate::context::AppContext;
use anyhow::{bail, Context};
use clap::Args;
use fab_foundation::{derive_workspace_name, FabConfig};
use fab_ops::{gitlink, EnvFilePropagator, GitBinding, VariablePropagator, WorkspaceReconciler};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Prefix for the derived workspace name
    #[arg(long)]
    prefix: Option<String>,

    /// Branch name folded into the workspace name
    #[arg(long, env = "FABOPS_BRANCH")]
    branch: String,

    /// Capacity to place a newly created workspace on
    #[arg(long, env = "FABOPS_CAPACITY_ID")]
    capacity_id: Option<String>,

    /// Git repository as owner/name; enables the git binding
    #[arg(long, requires = "connection_id")]
    repo: Option<String>,

    /// Configured git connection id
    #[arg(long)]
    connection_id: Option<String>,

    /// Branch to bind in git (defaults to the workspace branch)
    #[arg(long)]
    git_branch: Option<String>,

    /// Repository directory to bind
    #[arg(long, default_value = "/")]
    directory: String,

    /// Principal to grant Admin on the workspace
    #[arg(long)]
    admin_principal: Option<String>,

    /// Principal type for --admin-principal
    #[arg(long, default_value = "User")]
    principal_type: String,

    /// Append workspace_id=<id> to this file instead of stdout
    #[arg(long)]
    output_file: Option<PathBuf>,
}

pub async fn run(config: &FabConfig, args: ProvisionArgs) -> anyhow::Result<()> {
    let ctx = AppContext::new(config)?;
    let api = ctx.fabric_client().await?;

    let prefix = args
        .prefix
        .as_deref()
        .unwrap_or(config.workspace_prefix.as_str());
    let name = derive_workspace_name(prefix, &args.branch);
    let capacity_id = args.capacity_id.as_deref().or(config.capacity_id.as_deref());

    let reconciler = WorkspaceReconciler::new(&api);
    let workspace_id = reconciler.reconcile(&name, capacity_id).await?;

    // --repo wins over any git settings carried in the configuration.
    let binding = match &args.repo {
        Some(repo) => {
            let (owner, repo_name) = repo
                .split_once('/')
                .with_context(|| format!("--repo must be owner/name, got '{repo}'"))?;
            let connection_id = match &args.connection_id {
                Some(id) => id,
                None => bail!("--connection-id is required with --repo"),
            };
            Some(GitBinding::github(
                owner,
                repo_name,
                args.git_branch.as_deref().unwrap_or(&args.branch),
                &args.directory,
                connection_id,
            ))
        }
        None => config.git.as_ref().map(|git| {
            GitBinding::github(
                &git.owner,
                &git.repo_name,
                &git.branch,
                &git.directory,
                &git.connection_id,
            )
        }),
    };
    if let Some(binding) = &binding {
        // AlreadyConnected is logged as a warning inside connect and still
        // counts as success.
        gitlink::connect(&api, &workspace_id, binding).await?;
    }

    if let Some(principal) = &args.admin_principal {
        reconciler
            .assign_role(&workspace_id, principal, &args.principal_type, "Admin")
            .await?;
    }

    info!(workspace = %name, workspace_id = %workspace_id, "provisioned");

    match &args.output_file {
        Some(path) => {
            let mut propagator = EnvFilePropagator::new(path);
            propagator.set_variable("workspace_id", &workspace_id)?;
        }
        None => println!("workspace_id={workspace_id}"),
    }
    Ok(())
}
