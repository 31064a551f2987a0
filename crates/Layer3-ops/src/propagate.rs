//! Variable/secret propagation into a CI configuration store
//!
//! The pipeline only needs two idempotent operations; everything else
//! (auth, retries) belongs to the store behind the trait.

use fab_foundation::{Error, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pushes name/value pairs into a CI configuration store. Both operations
/// are idempotent: repeated calls with the same name overwrite.
pub trait VariablePropagator {
    fn set_variable(&mut self, name: &str, value: &str) -> Result<()>;

    /// Like `set_variable`, but the value must never reach logs or
    /// non-secret output.
    fn set_secret(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Propagator that appends `name=value` assignment lines to an output
/// file, the way CI systems consume per-step output variables. An existing
/// entry for the same name is rewritten in place.
///
/// The format is line-based, so names and values must be single-line; a
/// multi-line value belongs in the variable-library document instead.
pub struct EnvFilePropagator {
    path: PathBuf,
}

impl EnvFilePropagator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entry(&self, name: &str, value: &str) -> Result<()> {
        // A line break in either part would split into phantom entries on
        // the next read.
        if name.contains(['\n', '\r']) || value.contains(['\n', '\r']) {
            return Err(Error::InvalidInput(format!(
                "output-variable '{name}' must be single-line"
            )));
        }

        let existing = if self.path.exists() {
            std::fs::read_to_string(&self.path)?
        } else {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            String::new()
        };

        let prefix = format!("{name}=");
        let mut out = String::new();
        let mut replaced = false;
        for line in existing.lines() {
            if line.starts_with(&prefix) {
                writeln!(out, "{name}={value}").ok();
                replaced = true;
            } else {
                out.push_str(line);
                out.push('\n');
            }
        }
        if !replaced {
            writeln!(out, "{name}={value}").ok();
        }

        std::fs::write(&self.path, out)?;
        Ok(())
    }
}

impl VariablePropagator for EnvFilePropagator {
    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        self.write_entry(name, value)?;
        info!(name, value, path = %self.path.display(), "propagated variable");
        Ok(())
    }

    fn set_secret(&mut self, name: &str, value: &str) -> Result<()> {
        self.write_entry(name, value)?;
        // Only the name is loggable.
        debug!(name, path = %self.path.display(), "propagated secret");
        Ok(())
    }
}
