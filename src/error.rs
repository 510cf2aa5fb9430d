//! Error types for taskcal
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (blank task, stale task position, bad date, bad config)
//! - 4: Operation failed (I/O, serialization, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskcal CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskcal operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Task text cannot be empty")]
    EmptyTask,

    #[error("No task at position {} for {key} ({len} task(s) on that day)", .index + 1)]
    IndexOutOfRange { key: String, index: usize, len: usize },

    #[error("Malformed date key: {0}")]
    MalformedKey(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No chart available to export yet")]
    NoChart,

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::EmptyTask
            | Error::IndexOutOfRange { .. }
            | Error::MalformedKey(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::NoChart => exit_codes::USER_ERROR,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured context for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::IndexOutOfRange { key, index, len } => Some(serde_json::json!({
                "date": key,
                "index": index,
                "len": len,
            })),
            Error::MalformedKey(key) => Some(serde_json::json!({ "key": key })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for taskcal operations
pub type Result<T> = std::result::Result<T, Error>;
