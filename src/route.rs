//! Routing table inspection
//!
//! Parses `ip route` output to find out which interface currently carries
//! the default route.

use crate::error::{Error, Result};
use crate::exec;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// A single line of the routing table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// All whitespace separated tokens of the line
    tokens: Vec<String>,
}

impl RouteEntry {
    /// Parse one line, `None` when it is blank
    fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return None;
        }
        Some(Self { tokens })
    }

    /// Whether this line is a default route
    pub fn is_default(&self) -> bool {
        self.tokens[0] == "default"
    }

    /// Whether `token` appears as a whole word anywhere on the line
    pub fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

/// Snapshot of the IPv4 routing table
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Parse `ip route` output, one route per line
    pub fn parse(text: &str) -> Self {
        Self {
            entries: text.lines().filter_map(RouteEntry::parse).collect(),
        }
    }

    /// All parsed routes in table order
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// First default route naming `interface`
    pub fn default_via(&self, interface: &str) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .find(|e| e.is_default() && e.has_token(interface))
    }
}

/// Source of routing table text
pub trait RouteSource {
    /// Dump the current routing table
    fn route_table(&mut self) -> Result<String>;
}

/// Answers whether the default route goes through an interface
pub trait RouteCheck {
    fn is_default_route_via(&mut self, interface: &str) -> Result<bool>;
}

/// Routing table read from iproute2
#[derive(Debug, Clone)]
pub struct IpRoute {
    program: PathBuf,
}

impl IpRoute {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-4", "route", "show"]);
        cmd
    }
}

impl RouteSource for IpRoute {
    fn route_table(&mut self) -> Result<String> {
        let mut cmd = self.command();
        let output = cmd.output().map_err(|e| Error::CommandSpawn {
            command: exec::describe(&cmd),
            source: e,
        })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: exec::describe(&cmd),
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Route checker that parses a fresh table on every call
#[derive(Debug, Clone)]
pub struct RouteChecker<S> {
    source: S,
}

impl<S: RouteSource> RouteChecker<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: RouteSource> RouteCheck for RouteChecker<S> {
    fn is_default_route_via(&mut self, interface: &str) -> Result<bool> {
        let table = RouteTable::parse(&self.source.route_table()?);
        let via = table.default_via(interface).is_some();
        debug!(
            interface,
            routes = table.entries().len(),
            via,
            "inspected routing table"
        );
        Ok(via)
    }
}
