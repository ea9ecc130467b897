//! Stop requests from the service manager
//!
//! SIGINT, SIGTERM and SIGHUP raise the watchdog's stop signal, which the
//! scheduler polls between checks, during its sleeps and before rebooting.

use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Route termination signals to `stop_signal`
///
/// Can only be called once per process.
pub fn install(stop_signal: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        stop_signal.store(true, Ordering::SeqCst);
        info!("stop requested");
    })?;
    Ok(())
}
