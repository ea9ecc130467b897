//! Unified error types for cellwatch

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for watchdog operations
#[derive(Error, Debug)]
pub enum Error {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Config errors
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation failed: {0}")]
    ConfigValidation(String),

    // External command errors
    #[error("Failed to execute '{command}': {source}")]
    CommandSpawn { command: String, source: io::Error },

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Reboot command '{command}' failed: {message}")]
    RebootFailed { command: String, message: String },

    // Process setup errors
    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error aborts the daemon instead of a single check
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::RebootFailed { .. })
    }
}

/// Result type alias for watchdog operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reboot_failure_is_fatal() {
        let err = Error::RebootFailed {
            command: "/sbin/reboot".to_string(),
            message: "exit status: 1".to_string(),
        };
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Reboot command '/sbin/reboot' failed: exit status: 1"
        );
    }

    #[test]
    fn test_check_failures_are_not_fatal() {
        let err = Error::CommandFailed {
            command: "ip -4 route show".to_string(),
            message: "RTNETLINK answers: Operation not permitted".to_string(),
        };
        assert!(!err.is_fatal());

        let err = Error::CommandSpawn {
            command: "ping".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!err.is_fatal());
    }
}
