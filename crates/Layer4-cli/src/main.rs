//! FabOps CLI - Main entry point

mod context;
mod probe;
mod provision;
mod teardown;
mod varlib;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// FabOps - workspace provisioning and permission probing for Fabric
#[derive(Parser, Debug)]
#[command(name = "fabops")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Entra tenant id (overrides env and config)
    #[arg(long, global = true, env = "FABOPS_TENANT_ID", hide_env_values = true)]
    tenant_id: Option<String>,

    /// Service principal client id
    #[arg(long, global = true, env = "FABOPS_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,

    /// Service principal client secret
    #[arg(long, global = true, env = "FABOPS_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find or create a workspace for a branch, optionally bind it to git
    Provision(provision::ProvisionArgs),
    /// Probe what the current credential is allowed to do
    Probe(probe::ProbeArgs),
    /// Disconnect git and delete a workspace
    Teardown(teardown::TeardownArgs),
    /// Build or update a workspace variable-library document
    Varlib(varlib::VarlibArgs),
}

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Help and version go to stdout and exit 0; anything else is a
            // usage error on stderr with exit code 1.
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    // All log lines go to stderr; stdout carries only structured output.
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = context::build_config(
        args.tenant_id.as_deref(),
        args.client_id.as_deref(),
        args.client_secret.as_deref(),
    );

    match args.command {
        Command::Provision(cmd) => provision::run(&config, cmd).await,
        Command::Probe(cmd) => probe::run(&config, cmd).await,
        Command::Teardown(cmd) => teardown::run(&config, cmd).await,
        Command::Varlib(cmd) => varlib::run(cmd),
    }
}
