//! Foundation layer for FabOps
//!
//! Shared building blocks for every other layer:
//! - `error` - central error taxonomy and `Result` alias
//! - `config` - explicit configuration structs (no hidden env globals)
//! - `strings` - resource-name derivation and display helpers

pub mod config;
pub mod error;
pub mod strings;

pub use config::{Credential, FabConfig, GitSettings};
pub use error::{Error, Result};
pub use strings::{derive_workspace_name, truncate_detail};
