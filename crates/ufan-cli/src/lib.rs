//! Command-line front end for the ufan broker and clients.
//!
//! The `ufan` binary wires [`Cli`] to the handlers in [`handlers`]; this
//! library exposes the pieces so they can be tested without a process.

#![deny(unsafe_code)]

pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;

pub use commands::Commands;
pub use error::{CliError, exit_code_for};
pub use parser::Cli;

use anyhow::Result;
use clap::CommandFactory;

use ufan_core::{CoreError, Settings};

/// Resolve settings from `UFAN_*` variables (read through `lookup`) and
/// the global flags.
pub fn resolve_settings(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Settings, CoreError> {
    let mut settings = Settings::from_lookup(lookup)?;
    if let Some(path) = &cli.log_file {
        settings.log_file = Some(path.clone());
    }
    ufan_core::validate_settings(&settings)?;
    Ok(settings)
}

/// Dispatch a parsed command line against the process environment.
pub async fn run(cli: Cli) -> Result<()> {
    run_with_env(cli, |key| std::env::var(key).ok()).await
}

/// Dispatch a parsed command line, reading `UFAN_*` variables through `lookup`.
pub async fn run_with_env(cli: Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    // Logging first so environment overrides show up in the debug output
    logging::init(cli.verbose, cli.log_file.as_deref()).map_err(CliError::from)?;
    let settings = resolve_settings(&cli, lookup).map_err(CliError::from)?;

    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Server { bind } => handlers::server::execute(&settings, bind.as_deref()).await,
        Commands::Publish {
            endpoint,
            topic,
            data,
        } => handlers::publish::execute(&endpoint, &topic, &data).await,
        Commands::Subscribe { endpoint, topic } => {
            handlers::subscribe::execute(&settings, &endpoint, &topic).await
        }
        Commands::Latency {
            server,
            publish_topic,
            subscribe_topic,
            period_ms,
        } => {
            let args = handlers::latency::LatencyArgs {
                server,
                publish_topic,
                subscribe_topic,
                period_ms,
            };
            handlers::latency::execute(&settings, args).await
        }
        Commands::Settings => handlers::settings::execute(&settings),
    }
}
