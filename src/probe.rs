//! Connectivity probing
//!
//! Provides:
//! - The `Pinger` port and its `ping(8)` implementation
//! - `Prober`, which walks the host list with a per-host retry budget
//! - `ProbeReport`, the per-host outcome of one probe

use crate::error::{Error, Result};
use crate::exec;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// Extra time granted to ping before it is killed
const PING_GRACE: Duration = Duration::from_secs(5);

/// Sends a single echo request
pub trait Pinger {
    /// Returns `Ok(false)` when the host did not answer; `Err` only when
    /// the ping could not be attempted at all.
    fn ping_host(&mut self, host: &str) -> Result<bool>;
}

/// Pinger backed by the system `ping` binary
#[derive(Debug, Clone)]
pub struct SystemPinger {
    program: PathBuf,
    timeout: Duration,
}

impl SystemPinger {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Single echo, numeric, quiet, with a deadline
    fn command(&self, host: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-n", "-q", "-c1"])
            .arg(format!("-w{}", self.timeout.as_secs()))
            .arg(host)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Pinger for SystemPinger {
    fn ping_host(&mut self, host: &str) -> Result<bool> {
        let mut cmd = self.command(host);
        let mut child = cmd.spawn().map_err(|e| Error::CommandSpawn {
            command: exec::describe(&cmd),
            source: e,
        })?;

        match exec::wait_timeout(&mut child, self.timeout + PING_GRACE)? {
            Some(status) => {
                if !status.success() {
                    debug!(host, %status, "ping failed");
                }
                Ok(status.success())
            }
            None => {
                warn!(host, "ping did not exit within its deadline, killed");
                Ok(false)
            }
        }
    }
}

/// Outcome for a single host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostOutcome {
    pub host: String,
    /// Pings sent to this host
    pub attempts: u32,
    /// Whether any of them was answered
    pub reachable: bool,
}

/// Result of one probe across the host list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub hosts: Vec<HostOutcome>,
}

impl ProbeReport {
    /// Connectivity is confirmed when any host answered
    pub fn is_connected(&self) -> bool {
        self.hosts.iter().any(|h| h.reachable)
    }

    /// Total pings sent
    pub fn attempts(&self) -> u32 {
        self.hosts.iter().map(|h| h.attempts).sum()
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .hosts
            .iter()
            .map(|h| {
                let status = if h.reachable { "ok" } else { "unreachable" };
                format!("{}:{} ({} attempts)", h.host, status, h.attempts)
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Probes every host with its own retry budget
#[derive(Debug)]
pub struct Prober<P> {
    pinger: P,
    hosts: Vec<String>,
    retries: u32,
}

impl<P: Pinger> Prober<P> {
    pub fn new(pinger: P, hosts: Vec<String>, retries: u32) -> Self {
        Self {
            pinger,
            hosts,
            retries,
        }
    }

    /// Get the hosts being probed
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    #[cfg(test)]
    pub fn pinger(&self) -> &P {
        &self.pinger
    }

    /// Ping each host until it answers or its budget is spent
    pub fn probe(&mut self) -> Result<ProbeReport> {
        let mut report = ProbeReport::default();

        for host in &self.hosts {
            let mut outcome = HostOutcome {
                host: host.clone(),
                attempts: 0,
                reachable: false,
            };

            while outcome.attempts < self.retries {
                outcome.attempts += 1;
                if self.pinger.ping_host(host)? {
                    outcome.reachable = true;
                    break;
                }
                debug!(host = %host, attempt = outcome.attempts, retries = self.retries, "no reply");
            }

            if !outcome.reachable {
                warn!(host = %host, attempts = outcome.attempts, "host unreachable");
            }
            report.hosts.push(outcome);
        }

        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Pinger that replays scripted results and records every call
    pub(crate) struct ScriptedPinger {
        script: VecDeque<bool>,
        fallback: bool,
        pub calls: Vec<String>,
    }

    impl ScriptedPinger {
        pub fn always(result: bool) -> Self {
            Self::script(Vec::new(), result)
        }

        pub fn script(results: Vec<bool>, fallback: bool) -> Self {
            Self {
                script: results.into(),
                fallback,
                calls: Vec::new(),
            }
        }
    }

    impl Pinger for ScriptedPinger {
        fn ping_host(&mut self, host: &str) -> Result<bool> {
            self.calls.push(host.to_string());
            Ok(self.script.pop_front().unwrap_or(self.fallback))
        }
    }

    fn hosts() -> Vec<String> {
        vec!["8.8.8.8".to_string(), "8.8.4.4".to_string()]
    }

    #[test]
    fn test_all_hosts_answer_first_time() {
        let mut prober = Prober::new(ScriptedPinger::always(true), hosts(), 5);
        let report = prober.probe().unwrap();

        assert!(report.is_connected());
        assert_eq!(report.attempts(), 2);
        assert_eq!(prober.pinger.calls, vec!["8.8.8.8", "8.8.4.4"]);
    }

    #[test]
    fn test_all_pings_fail() {
        let mut prober = Prober::new(ScriptedPinger::always(false), hosts(), 5);
        let report = prober.probe().unwrap();

        assert!(!report.is_connected());
        assert_eq!(report.attempts(), 2 * 5);
        assert_eq!(prober.pinger.calls[..5], ["8.8.8.8"; 5]);
        assert_eq!(prober.pinger.calls[5..], ["8.8.4.4"; 5]);
    }

    #[test]
    fn test_first_host_exhausted_second_answers() {
        let mut script = vec![false; 5];
        script.extend(vec![true; 50]);
        let mut prober = Prober::new(ScriptedPinger::script(script, true), hosts(), 5);
        let report = prober.probe().unwrap();

        assert!(report.is_connected());
        assert_eq!(report.attempts(), 5 + 1);
        assert_eq!(
            report.hosts,
            vec![
                HostOutcome {
                    host: "8.8.8.8".to_string(),
                    attempts: 5,
                    reachable: false
                },
                HostOutcome {
                    host: "8.8.4.4".to_string(),
                    attempts: 1,
                    reachable: true
                },
            ]
        );
    }

    #[test]
    fn test_retry_stops_at_first_success() {
        let script = vec![false, false, true, true];
        let mut prober = Prober::new(ScriptedPinger::script(script, false), hosts(), 5);
        let report = prober.probe().unwrap();

        assert_eq!(report.hosts[0].attempts, 3);
        assert_eq!(report.hosts[1].attempts, 1);
        assert_eq!(report.attempts(), 4);
    }

    #[test]
    fn test_ping_error_aborts_probe() {
        struct Broken;
        impl Pinger for Broken {
            fn ping_host(&mut self, _host: &str) -> Result<bool> {
                Err(Error::CommandSpawn {
                    command: "ping".to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            }
        }

        let mut prober = Prober::new(Broken, hosts(), 5);
        assert!(matches!(prober.probe(), Err(Error::CommandSpawn { .. })));
    }

    #[test]
    fn test_report_display() {
        let report = ProbeReport {
            hosts: vec![
                HostOutcome {
                    host: "8.8.8.8".to_string(),
                    attempts: 5,
                    reachable: false,
                },
                HostOutcome {
                    host: "8.8.4.4".to_string(),
                    attempts: 1,
                    reachable: true,
                },
            ],
        };
        assert_eq!(
            report.to_string(),
            "8.8.8.8:unreachable (5 attempts), 8.8.4.4:ok (1 attempts)"
        );
    }

    #[test]
    fn test_ping_command_line() {
        let pinger = SystemPinger::new("ping", Duration::from_secs(30));
        assert_eq!(
            exec::describe(&pinger.command("1.2.3.4")),
            "ping -n -q -c1 -w30 1.2.3.4"
        );
    }

    #[test]
    fn test_system_pinger_exit_status() {
        // true/false ignore their arguments and stand in for ping
        let mut ok = SystemPinger::new("true", Duration::from_secs(30));
        assert!(ok.ping_host("1.2.3.4").unwrap());

        let mut failing = SystemPinger::new("false", Duration::from_secs(30));
        assert!(!failing.ping_host("1.2.3.4").unwrap());
    }

    #[test]
    fn test_system_pinger_missing_binary() {
        let mut pinger = SystemPinger::new("/nonexistent/ping", Duration::from_secs(1));
        assert!(matches!(
            pinger.ping_host("1.2.3.4"),
            Err(Error::CommandSpawn { .. })
        ));
    }
}
