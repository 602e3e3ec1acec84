/*!
 * Error types for thermalctl
 */

use std::io;
use std::path::PathBuf;
use thermal_connect::{ConnectError, OutcomeError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_APPLICATION: i32 = 1;
pub const EXIT_FATAL: i32 = 2;
pub const EXIT_TRANSPORT: i32 = 3;

#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration could not be loaded or applied
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connector could not be built
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Unknown profile '{0}' (see `thermalctl defaults`)")]
    UnknownProfile(String),

    #[error("Failed to access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Invalid profile document: {0}")]
    ProfileFormat(#[from] serde_json::Error),

    /// The service call failed
    #[error(transparent)]
    Outcome(#[from] OutcomeError),
}

impl CliError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Outcome(OutcomeError::Application { .. }) => EXIT_APPLICATION,
            CliError::Outcome(OutcomeError::Transport { .. }) => EXIT_TRANSPORT,
            CliError::Config(_)
            | CliError::Connect(_)
            | CliError::UnknownProfile(_)
            | CliError::Io { .. }
            | CliError::ProfileFormat(_) => EXIT_FATAL,
        }
    }

    /// Check if retrying the same command could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, CliError::Outcome(OutcomeError::Transport { .. }))
    }

    /// Message printed to the user before exiting
    pub fn report(&self) -> String {
        if self.is_transient() {
            format!(
                "Error: {}\nThe thermal service may be starting or unreachable; retry in a moment.",
                self
            )
        } else {
            format!("Error: {}", self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let app = CliError::Outcome(OutcomeError::Application {
            code: "PERMISSION_DENIED".to_string(),
            message: "denied".to_string(),
        });
        assert_eq!(app.exit_code(), EXIT_APPLICATION);
        assert!(!app.is_transient());

        let transport = CliError::Outcome(OutcomeError::Transport {
            code: "UNAVAILABLE".to_string(),
            message: "connection refused".to_string(),
        });
        assert_eq!(transport.exit_code(), EXIT_TRANSPORT);
        assert!(transport.is_transient());
        assert!(transport.report().contains("retry"));
        assert!(!app.report().contains("retry"));

        assert_eq!(
            CliError::UnknownProfile("Arctic".to_string()).exit_code(),
            EXIT_FATAL
        );
        assert_eq!(CliError::Config("bad".to_string()).exit_code(), EXIT_FATAL);
    }

    #[test]
    fn test_display() {
        let err = CliError::Outcome(OutcomeError::Application {
            code: "empty_response".to_string(),
            message: "service answered OK without a response payload".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Thermal service error empty_response: service answered OK without a response payload"
        );
    }
}
