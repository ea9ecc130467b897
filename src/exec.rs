//! Helpers for running external programs

use std::io;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while waiting on a child process
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Render a command line for log and error messages
pub fn describe(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

/// Wait for a child with timeout enforcement
///
/// Returns `Ok(None)` when the deadline passed; the child has then been
/// killed and reaped.
pub fn wait_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        match child.try_wait()? {
            Some(status) => return Ok(Some(status)),
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    // Reap the zombie
                    let _ = child.wait();
                    return Ok(None);
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}
