//! Watchdog configuration
//!
//! Every field defaults to the fixed watchdog contract, so an absent or empty
//! config file yields the stock `usb0` / 300 s / 5 retries behavior.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Load configuration from a TOML file
pub fn load(path: &Path) -> Result<WatchdogConfig> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: WatchdogConfig = toml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct WatchdogConfig {
    /// Interface whose default route is being watched
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Hosts to ping, in order
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,

    /// Seconds to sleep before every check
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Ping attempts per host before that host counts as unreachable
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Deadline of a single ping in seconds
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,

    /// External programs
    #[serde(default)]
    pub commands: CommandPaths,
}

fn default_interface() -> String {
    "usb0".to_string()
}

fn default_hosts() -> Vec<String> {
    vec!["8.8.8.8".to_string(), "8.8.4.4".to_string()]
}

fn default_interval() -> u64 {
    300
}

fn default_retries() -> u32 {
    5
}

fn default_ping_timeout() -> u64 {
    30
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            hosts: default_hosts(),
            interval: default_interval(),
            retries: default_retries(),
            ping_timeout: default_ping_timeout(),
            commands: CommandPaths::default(),
        }
    }
}

impl WatchdogConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.interface.is_empty() {
            return Err(Error::ConfigValidation("interface must not be empty".into()));
        }

        // Route matching is token based, so a name with whitespace can never match
        if self.interface.chars().any(char::is_whitespace) {
            return Err(Error::ConfigValidation(format!(
                "interface '{}' contains whitespace",
                self.interface
            )));
        }

        if self.hosts.is_empty() {
            return Err(Error::ConfigValidation("at least one host is required".into()));
        }

        if let Some(host) = self.hosts.iter().find(|h| h.trim().is_empty()) {
            return Err(Error::ConfigValidation(format!("invalid host '{}'", host)));
        }

        if self.retries == 0 {
            return Err(Error::ConfigValidation("retries must be at least 1".into()));
        }

        if self.interval == 0 {
            return Err(Error::ConfigValidation("interval must be at least 1 second".into()));
        }

        if self.ping_timeout == 0 {
            return Err(Error::ConfigValidation(
                "ping_timeout must be at least 1 second".into(),
            ));
        }

        Ok(())
    }

    /// Get the check interval as Duration
    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Get the ping deadline as Duration
    pub fn ping_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.ping_timeout)
    }
}

/// Paths of the external programs the watchdog shells out to
#[derive(Debug, Clone, Deserialize)]
pub struct CommandPaths {
    /// iproute2 binary used to dump the routing table
    #[serde(default = "default_ip")]
    pub ip: PathBuf,

    /// ping binary
    #[serde(default = "default_ping")]
    pub ping: PathBuf,

    /// Reboot binary, run without arguments
    #[serde(default = "default_reboot")]
    pub reboot: PathBuf,
}

fn default_ip() -> PathBuf {
    PathBuf::from("ip")
}

fn default_ping() -> PathBuf {
    PathBuf::from("ping")
}

fn default_reboot() -> PathBuf {
    PathBuf::from("/sbin/reboot")
}

impl Default for CommandPaths {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            ping: default_ping(),
            reboot: default_reboot(),
        }
    }
}
