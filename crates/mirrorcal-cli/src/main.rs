//! mirrorcal CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use mirrorcal_core::{TracingConfig, init_tracing};

use mirrorcal_cli::cli::{Cli, Command, ConfigAction, UpcomingArgs};
use mirrorcal_cli::commands;
use mirrorcal_cli::config::{DisplayZone, MirrorConfig};
use mirrorcal_cli::error::{CliError, CliResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config =
        TracingConfig::from_verbosity(cli.verbose).with_format(cli.log_format.into());

    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", CliError::from(e));
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(MirrorConfig::default_path);
    let config = if cli.config.is_some() {
        MirrorConfig::load_from(&config_path)
    } else {
        MirrorConfig::load()
    }
    .map_err(CliError::Config)?
    .with_env_overrides();

    let zone = match cli.timezone {
        Some(ref name) => DisplayZone::parse(Some(name)).map_err(CliError::InvalidArgument)?,
        None => config.display_zone().map_err(CliError::Config)?,
    };
    let sources = commands::effective_sources(&config, &cli.sources);

    match cli.command {
        Some(Command::Upcoming(ref args)) => {
            commands::upcoming::run(&config, &sources, zone, args, cli.json).await
        }
        Some(Command::Month(ref args)) => {
            commands::month::run(&config, &sources, zone, args, cli.json).await
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
        None => {
            commands::upcoming::run(&config, &sources, zone, &UpcomingArgs::default(), cli.json)
                .await
        }
    }
}
