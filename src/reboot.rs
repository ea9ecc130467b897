//! Handling of system reboot

use crate::error::{Error, Result};
use crate::exec;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

/// Restarts the machine
pub trait Rebooter {
    fn reboot(&mut self) -> Result<()>;
}

/// Rebooter that runs the system reboot binary without arguments
#[derive(Debug, Clone)]
pub struct SystemReboot {
    program: PathBuf,
    dry_run: bool,
}

impl SystemReboot {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            dry_run: false,
        }
    }

    /// Only log instead of rebooting
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }
}

impl Rebooter for SystemReboot {
    fn reboot(&mut self) -> Result<()> {
        let mut cmd = self.command();
        let command = exec::describe(&cmd);

        if self.dry_run {
            warn!(%command, "dry run, not rebooting");
            return Ok(());
        }

        warn!(%command, "rebooting system");

        // Flush output streams, the process may not survive the command
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        let status = cmd.status().map_err(|e| Error::RebootFailed {
            command: command.clone(),
            message: e.to_string(),
        })?;

        if !status.success() {
            return Err(Error::RebootFailed {
                command,
                message: status.to_string(),
            });
        }

        info!("reboot initiated");
        Ok(())
    }
}
