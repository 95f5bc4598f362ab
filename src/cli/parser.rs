//! Clap argument definitions.

use clap::{Parser, Subcommand};

/// Scheduled prompt execution and token accounting service
#[derive(Debug, Parser)]
#[command(
    name = "herald",
    version = crate::pkg_version(),
    long_version = crate::clap_long_version(),
    about = "Scheduled prompt execution and token accounting service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind address override
        #[arg(long)]
        host: Option<String>,

        /// Port override
        #[arg(long)]
        port: Option<u16>,

        /// Log level override, e.g. "debug"
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Apply pending database migrations and exit
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from(["herald", "serve", "--port", "8080", "--log-level", "debug"])
            .unwrap();
        match cli.command {
            Command::Serve { port, log_level, .. } => {
                assert_eq!(port, Some(8080));
                assert_eq!(log_level.as_deref(), Some("debug"));
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn migrate_parses() {
        let cli = Cli::try_parse_from(["herald", "migrate"]).unwrap();
        assert!(matches!(cli.command, Command::Migrate));
    }
}
