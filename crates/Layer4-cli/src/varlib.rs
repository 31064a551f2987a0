//! `fabops varlib` - maintain the workspace variable-library document

use anyhow::Context;
use clap::Args;
use fab_ops::{EnvFilePropagator, VariableLibrary, VariablePropagator};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct VarlibArgs {
    /// Path of the variable-library document
    #[arg(long)]
    out: PathBuf,

    /// Variable to set, as NAME=VALUE (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", required = true)]
    set: Vec<String>,

    /// Also push the pairs into this output-variable file
    #[arg(long)]
    propagate: Option<PathBuf>,
}

pub fn run(args: VarlibArgs) -> anyhow::Result<()> {
    let mut library = VariableLibrary::load_or_new(&args.out)?;

    let mut pairs = Vec::with_capacity(args.set.len());
    for assignment in &args.set {
        let (name, value) = assignment
            .split_once('=')
            .with_context(|| format!("--set expects NAME=VALUE, got '{assignment}'"))?;
        pairs.push((name.to_string(), value.to_string()));
    }

    for (name, value) in &pairs {
        library.set(name, value);
    }
    library.save(&args.out)?;
    info!(path = %args.out.display(), count = library.len(), "variable library updated");

    if let Some(path) = &args.propagate {
        let mut propagator = EnvFilePropagator::new(path);
        for (name, value) in &pairs {
            propagator.set_variable(name, value)?;
        }
    }
    Ok(())
}
