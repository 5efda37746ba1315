//! CLI, configuration and commands
//!
//! This crate provides the `mirrorcal` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use config::{DisplayZone, MirrorConfig};
pub use error::{CliError, CliResult};
