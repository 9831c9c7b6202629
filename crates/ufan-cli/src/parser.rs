//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the ufan UDP pub/sub broker.
#[derive(Debug, Parser)]
#[command(name = "ufan")]
#[command(about = "UDP publish/subscribe fan-out broker and clients")]
#[command(version)]
pub struct Cli {
    /// Append logs to this file instead of writing them to stderr
    #[arg(long = "log-file", global = true, env = "UFAN_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "ufan",
            "--verbose",
            "--log-file",
            "/tmp/ufan.log",
            "settings",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/ufan.log")));
        assert!(matches!(cli.command, Some(Commands::Settings)));
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from(["ufan", "server", "-v"]);
        assert!(cli.verbose);
    }
}
