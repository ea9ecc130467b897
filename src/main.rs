//! cellwatch - cellular uplink watchdog
//!
//! Periodically verifies that the default route through the modem interface
//! actually reaches the internet, and reboots the machine when it does not.

mod cli;
mod config;
mod error;
mod exec;
mod logging;
mod probe;
mod reboot;
mod route;
mod signal;
mod watchdog;

use cli::{Cli, Commands};
use config::WatchdogConfig;
use error::Result;
use nix::unistd::Uid;
use std::sync::atomic::Ordering;
use tracing::{info, warn};
use watchdog::SystemWatchdog;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let command = cli.command.unwrap_or_default();

    // Commands that don't require config
    if let Commands::Completion { shell } = command {
        Cli::generate_completion(shell);
        return Ok(());
    }

    logging::init_logging(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => config::load(path)?,
        None => WatchdogConfig::default(),
    };

    match command {
        Commands::Run { once, dry_run } => {
            if !dry_run && !Uid::effective().is_root() {
                warn!(
                    reboot = %config.commands.reboot.display(),
                    "not running as root, reboot will likely fail"
                );
            }

            let mut watchdog = SystemWatchdog::from_config(&config, dry_run);

            if once {
                let verdict = watchdog.tick()?;
                info!(interface = watchdog.interface(), %verdict, "check complete");
                return Ok(());
            }

            let stop_signal = watchdog.stop_signal();
            signal::install(watchdog.stop_signal())?;
            watchdog.run(move || !stop_signal.load(Ordering::SeqCst))
        }

        Commands::Check { json } => {
            let mut watchdog = SystemWatchdog::from_config(&config, true);
            let verdict = watchdog.check()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                println!("{}: {}", watchdog.interface(), verdict);
            }

            if verdict.is_disconnected() {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Completion { .. } => Ok(()),
    }
}
