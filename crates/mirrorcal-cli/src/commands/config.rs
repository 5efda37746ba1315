//! Configuration commands.

use std::path::Path;

use crate::config::MirrorConfig;
use crate::error::{CliError, CliResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &MirrorConfig, path: &Path) -> CliResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| CliError::Serialize(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &MirrorConfig) -> CliResult<()> {
    config.validate().map_err(CliError::Config)?;
    println!(
        "Configuration is valid ({} source{}).",
        config.calendar.sources.len(),
        if config.calendar.sources.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> CliResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
