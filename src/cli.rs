//! Command-line interface for cellwatch
//!
//! Uses clap with derive for type-safe CLI parsing

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// cellwatch - reboot the host when its cellular uplink goes dead
#[derive(Parser)]
#[command(name = "cellwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the watchdog loop (default)
    Run {
        /// Check once immediately, then exit
        #[arg(long)]
        once: bool,

        /// Log instead of rebooting
        #[arg(long)]
        dry_run: bool,
    },

    /// Check connectivity once and report, never reboots
    Check {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            once: false,
            dry_run: false,
        }
    }
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Generate shell completion scripts
    pub fn generate_completion(shell: Shell) {
        let mut cmd = Self::command();
        clap_complete::generate(shell, &mut cmd, "cellwatch", &mut std::io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::try_parse_from(["cellwatch"]).unwrap();
        assert_eq!(cli.command.unwrap_or_default(), Commands::default());
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_run_flags() {
        let cli =
            Cli::try_parse_from(["cellwatch", "run", "--once", "--dry-run", "-c", "/etc/cellwatch.toml"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Run {
                once: true,
                dry_run: true
            })
        );
        assert_eq!(cli.config, Some(PathBuf::from("/etc/cellwatch.toml")));
    }

    #[test]
    fn test_check_json() {
        let cli = Cli::try_parse_from(["cellwatch", "-v", "check", "--json"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Check { json: true }));
        assert!(cli.verbose);
    }
}
