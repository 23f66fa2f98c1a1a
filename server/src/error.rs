//! Error types for the Modal MCP server
//!
//! Errors never leave the process as typed values: every tool renders the
//! `Display` text of the error as its response, so the messages below are
//! the exact strings an agent sees.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any subprocess was started
    Validation,
    /// The subprocess could not be started or exited unsuccessfully
    Subprocess,
    /// The subprocess was killed after its time budget ran out
    Timeout,
}

/// Main error type for the Modal MCP server
#[derive(Debug, Error)]
pub enum Error {
    // Validation errors (1000-1999)
    #[error("Error: Path must be absolute, got: {0}")]
    PathNotAbsolute(String),

    #[error("Error: File not found: {0}")]
    FileNotFound(String),

    #[error("Error: Local path not found: {0}")]
    LocalPathNotFound(String),

    #[error("Error: Expected a .py file, got: {0}")]
    InvalidExtension(String),

    #[error("Error: Invalid path: {0}")]
    InvalidPath(String),

    #[error("Error: {0}")]
    InvalidParameter(String),

    // Subprocess errors (2000-2999)
    #[error("Modal CLI not found. Install: pip install modal && python3 -m modal setup")]
    CliNotFound,

    #[error("Error: executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("{}", render_command_failure(.exit_code, .stderr))]
    CommandFailed { exit_code: Option<i32>, stderr: String },

    // Timeout errors (3000-3999)
    #[error("Command timed out after {0}s")]
    CommandTimeout(u64),

    #[error("Error: Sandbox timed out after {0}s")]
    SandboxTimeout(u64),

    // General errors (9000-9999)
    #[error("Error: I/O failure: {0}")]
    Io(String),

    #[error("Error: Internal error: {0}")]
    Internal(String),
}

fn render_command_failure(exit_code: &Option<i32>, stderr: &str) -> String {
    if stderr.is_empty() {
        format!("Command failed (exit {})", exit_code.unwrap_or(-1))
    } else {
        format!("Error: {}", stderr)
    }
}

impl Error {
    /// Shorthand for an `InvalidParameter` error
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidParameter(message.into())
    }

    /// Get the error code
    pub fn code(&self) -> u32 {
        match self {
            // Validation errors (1000-1999)
            Error::PathNotAbsolute(_) => 1001,
            Error::FileNotFound(_) => 1002,
            Error::LocalPathNotFound(_) => 1003,
            Error::InvalidExtension(_) => 1004,
            Error::InvalidPath(_) => 1005,
            Error::InvalidParameter(_) => 1006,

            // Subprocess errors (2000-2999)
            Error::CliNotFound => 2001,
            Error::ExecutableNotFound(_) => 2002,
            Error::CommandFailed { .. } => 2003,

            // Timeout errors (3000-3999)
            Error::CommandTimeout(_) => 3001,
            Error::SandboxTimeout(_) => 3002,

            // General errors (9000-9999)
            Error::Io(_) => 9001,
            Error::Internal(_) => 9002,
        }
    }

    /// Classify the error into one of the three failure kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PathNotAbsolute(_)
            | Error::FileNotFound(_)
            | Error::LocalPathNotFound(_)
            | Error::InvalidExtension(_)
            | Error::InvalidPath(_)
            | Error::InvalidParameter(_) => ErrorKind::Validation,

            Error::CommandTimeout(_) | Error::SandboxTimeout(_) => ErrorKind::Timeout,

            Error::CliNotFound
            | Error::ExecutableNotFound(_)
            | Error::CommandFailed { .. }
            | Error::Io(_)
            | Error::Internal(_) => ErrorKind::Subprocess,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
