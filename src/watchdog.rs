//! The watchdog scheduler
//!
//! Sleeps, checks whether the watched interface carries the default route,
//! probes connectivity through it, and reboots the machine when no host
//! answers. Each iteration decides from its own measurements only.

use crate::config::WatchdogConfig;
use crate::error::Result;
use crate::probe::{Pinger, ProbeReport, Prober, SystemPinger};
use crate::reboot::{Rebooter, SystemReboot};
use crate::route::{IpRoute, RouteCheck, RouteChecker};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Blocks the loop between checks
pub trait Sleeper {
    /// Returns false when the sleep was cut short by a stop request
    fn sleep(&mut self, duration: Duration) -> bool;
}

/// Sleeper that wakes early once its stop signal is raised
#[derive(Debug, Clone)]
pub struct SystemSleeper {
    slice: Duration,
    stop_signal: Arc<AtomicBool>,
}

impl SystemSleeper {
    pub fn new(stop_signal: Arc<AtomicBool>) -> Self {
        Self {
            slice: Duration::from_secs(1),
            stop_signal,
        }
    }
}

impl Sleeper for SystemSleeper {
    fn sleep(&mut self, duration: Duration) -> bool {
        let start = Instant::now();
        loop {
            if self.stop_signal.load(Ordering::SeqCst) {
                return false;
            }
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return true;
            }
            thread::sleep(self.slice.min(duration - elapsed));
        }
    }
}

/// Result of a single connectivity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The watched interface does not carry the default route
    NotDefaultRoute,
    /// At least one host answered
    Connected { report: ProbeReport },
    /// No host answered within its retry budget
    Disconnected { report: ProbeReport },
}

impl Verdict {
    /// Whether this verdict calls for a reboot
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Verdict::Disconnected { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::NotDefaultRoute => write!(f, "not the default route"),
            Verdict::Connected { report } => write!(f, "connected [{}]", report),
            Verdict::Disconnected { report } => write!(f, "disconnected [{}]", report),
        }
    }
}

/// The connectivity watchdog
pub struct Watchdog<R, P, B, S> {
    /// Interface whose default route is watched
    interface: String,
    /// Sleep before every check
    interval: Duration,
    route: R,
    prober: Prober<P>,
    rebooter: B,
    sleeper: S,
    /// Raised to stop the loop and suppress a pending reboot
    stop_signal: Arc<AtomicBool>,
}

/// Watchdog wired to the real system commands
pub type SystemWatchdog =
    Watchdog<RouteChecker<IpRoute>, SystemPinger, SystemReboot, SystemSleeper>;

impl SystemWatchdog {
    /// Build a watchdog from configuration
    pub fn from_config(config: &WatchdogConfig, dry_run: bool) -> Self {
        let stop_signal = Arc::new(AtomicBool::new(false));
        Watchdog::new(
            config,
            RouteChecker::new(IpRoute::new(&config.commands.ip)),
            SystemPinger::new(&config.commands.ping, config.ping_timeout_duration()),
            SystemReboot::new(&config.commands.reboot).dry_run(dry_run),
            SystemSleeper::new(Arc::clone(&stop_signal)),
        )
        .with_stop_signal(stop_signal)
    }
}

impl<R, P, B, S> Watchdog<R, P, B, S>
where
    R: RouteCheck,
    P: Pinger,
    B: Rebooter,
    S: Sleeper,
{
    pub fn new(config: &WatchdogConfig, route: R, pinger: P, rebooter: B, sleeper: S) -> Self {
        Self {
            interface: config.interface.clone(),
            interval: config.interval_duration(),
            route,
            prober: Prober::new(pinger, config.hosts.clone(), config.retries),
            rebooter,
            sleeper,
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing stop signal, e.g. with the sleeper
    pub fn with_stop_signal(mut self, stop_signal: Arc<AtomicBool>) -> Self {
        self.stop_signal = stop_signal;
        self
    }

    /// Get the watched interface
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Get stop signal for external control
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Check if stop has been signaled
    pub fn is_stopped(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }

    /// Check the route and, if it goes through the interface, probe it
    pub fn check(&mut self) -> Result<Verdict> {
        if !self.route.is_default_route_via(&self.interface)? {
            return Ok(Verdict::NotDefaultRoute);
        }

        let report = self.prober.probe()?;
        if report.is_connected() {
            Ok(Verdict::Connected { report })
        } else {
            Ok(Verdict::Disconnected { report })
        }
    }

    /// Run one check and reboot if connectivity is lost
    ///
    /// A stop signaled while the check was running cancels the reboot.
    pub fn tick(&mut self) -> Result<Verdict> {
        let verdict = self.check()?;

        match &verdict {
            Verdict::NotDefaultRoute => {
                debug!(interface = %self.interface, "interface not in use, nothing to verify");
            }
            Verdict::Connected { report } => {
                info!(interface = %self.interface, attempts = report.attempts(), "connectivity ok");
            }
            Verdict::Disconnected { report } => {
                warn!(interface = %self.interface, %report, "connectivity lost");
                if self.is_stopped() {
                    info!("stop requested, not rebooting");
                } else {
                    self.rebooter.reboot()?;
                }
            }
        }

        Ok(verdict)
    }

    /// Run the watchdog loop
    ///
    /// `keep_running` is queried once at the top of every iteration. Failed
    /// checks are logged and retried next interval; only a failed reboot
    /// ends the loop with an error.
    pub fn run<F>(&mut self, mut keep_running: F) -> Result<()>
    where
        F: FnMut() -> bool,
    {
        info!(
            interface = %self.interface,
            interval = ?self.interval,
            hosts = ?self.prober.hosts(),
            "watchdog started"
        );

        while keep_running() {
            if !self.sleeper.sleep(self.interval) {
                info!("stop requested during sleep");
                break;
            }

            match self.tick() {
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => error!("check failed, retrying next interval: {}", e),
            }
        }

        info!("watchdog stopped");
        Ok(())
    }
}
