/// Error types for plocate-runner
///
/// This module defines all possible errors that can occur in the application.
/// Uses thiserror for ergonomic error handling.

use crate::core::DatabaseKind;
use thiserror::Error;

/// Main error type for plocate-runner operations
#[derive(Error, Debug)]
pub enum LocateError {
    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Search term is empty after trimming
    #[error("Search pattern is empty")]
    EmptyPattern,

    /// Search term can't be handed to the search tool
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Regex pattern or result filter failed to compile
    #[error("Invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// Category name not recognised
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Search request selects no database
    #[error("No database selected")]
    NoDatabases,

    /// Search tool could not be launched
    #[error("Failed to launch search for {database} database: {source}")]
    Spawn {
        database: DatabaseKind,
        #[source]
        source: std::io::Error,
    },

    /// Search tool exited with a failure status
    #[error("Search in {database} database exited with {code}: {stderr}")]
    ExitStatus {
        database: DatabaseKind,
        code: ExitCode,
        stderr: String,
    },

    /// Reading search output failed midway
    #[error("Failed to read output of {database} database search: {source}")]
    ReadOutput {
        database: DatabaseKind,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the search tool failed
    #[error("Failed to wait for {database} database search: {source}")]
    Wait {
        database: DatabaseKind,
        #[source]
        source: std::io::Error,
    },

    /// Desktop handler could not open a result
    #[error("Failed to open '{target}': {source}")]
    OpenFailed {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// Privilege escalation helper is not installed
    #[error("Privilege helper '{0}' was not found")]
    HelperNotFound(String),

    /// Authentication dismissed or refused by the privilege helper
    #[error("Authorization was denied for: {0}")]
    PrivilegeDenied(String),

    /// updatedb ran but failed
    #[error("Could not update database (command: {command}, exit status: {code}): {details}")]
    UpdateFailed {
        command: String,
        code: ExitCode,
        details: String,
    },

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Exit code of a child process; `None` when it was killed by a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub Option<i32>);

impl From<std::process::ExitStatus> for ExitCode {
    fn from(status: std::process::ExitStatus) -> Self {
        ExitCode(status.code())
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(code) => write!(f, "{}", code),
            None => write!(f, "signal"),
        }
    }
}

/// Result type alias for plocate-runner operations
pub type Result<T> = std::result::Result<T, LocateError>;

impl LocateError {
    /// Convert LocateError to a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LocateError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            LocateError::Serialization(e) => {
                format!("Configuration file is not valid JSON: {}", e)
            }
            LocateError::Config(msg) => {
                format!("Configuration issue: {}", msg)
            }
            LocateError::EmptyPattern => "Enter a search term first".to_string(),
            LocateError::InvalidPattern(reason) => {
                format!("The search term can't be used: {}", reason)
            }
            LocateError::InvalidRegex { pattern, .. } => {
                format!("'{}' is not a valid regular expression", pattern)
            }
            LocateError::UnknownCategory(name) => {
                format!("Unknown category '{}'", name)
            }
            LocateError::NoDatabases => "Select at least one database to search".to_string(),
            LocateError::Spawn { database, source } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    format!(
                        "Could not search the {} database: plocate is not installed",
                        database
                    )
                } else {
                    format!("Could not search the {} database: {}", database, source)
                }
            }
            LocateError::ExitStatus {
                database, stderr, ..
            } => {
                if stderr.is_empty() {
                    format!("Error executing plocate on the {} database", database)
                } else {
                    format!(
                        "Error executing plocate on the {} database:\n{}",
                        database, stderr
                    )
                }
            }
            LocateError::ReadOutput { database, source } => {
                format!("Lost output from the {} database search: {}", database, source)
            }
            LocateError::Wait { database, source } => {
                format!("Lost track of the {} database search: {}", database, source)
            }
            LocateError::OpenFailed { target, source } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    format!("Could not open '{}': it no longer exists", target)
                } else {
                    format!("Could not open '{}': {}", target, source)
                }
            }
            LocateError::HelperNotFound(helper) => format!(
                "The '{}' command was not found. Please ensure 'polkit' is installed and configured.",
                helper
            ),
            LocateError::PrivilegeDenied(_) => {
                "Database update cancelled: authorization was not granted".to_string()
            }
            LocateError::UpdateFailed {
                command,
                code,
                details,
            } => format!(
                "Could not update database:\nCommand: {}\nExit Status: {}\nDetails: \n{}",
                command, code, details
            ),
            LocateError::Generic(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let err = LocateError::UnknownCategory("spreadsheets".to_string());
        assert!(err.user_message().contains("spreadsheets"));

        let err = LocateError::HelperNotFound("pkexec".to_string());
        assert!(err.user_message().contains("polkit"));
    }

    #[test]
    fn test_error_display() {
        let err = LocateError::ExitStatus {
            database: DatabaseKind::Media,
            code: ExitCode(Some(2)),
            stderr: "no such file".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("media"));
        assert!(display.contains("exited with 2"));
    }

    #[test]
    fn test_spawn_not_found_message() {
        let err = LocateError::Spawn {
            database: DatabaseKind::System,
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.user_message().contains("not installed"));
    }

    #[test]
    fn test_wait_error_is_not_an_output_error() {
        let err = LocateError::Wait {
            database: DatabaseKind::Media,
            source: std::io::Error::from(std::io::ErrorKind::Interrupted),
        };
        assert!(err.to_string().contains("wait for media"));
        assert!(err.user_message().contains("Lost track of the media"));
        assert!(!err.user_message().contains("output"));
    }

    #[test]
    fn test_open_failed_message() {
        let err = LocateError::OpenFailed {
            target: "/gone/report.pdf".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.user_message().contains("no longer exists"));
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(ExitCode(Some(126)).to_string(), "126");
        assert_eq!(ExitCode(None).to_string(), "signal");
    }
}
