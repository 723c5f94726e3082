//! Error types for todomaster
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (validation failure, unknown task, malformed import)
//! - 4: Operation failed (storage read/write, lock contention, internal)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the todomaster CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for todomaster operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Import parse error: {0}")]
    Parse(String),

    // Operation failures (exit code 4)
    #[error("Storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

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

    /// A store action produced an outcome its caller does not handle
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Storage {
            operation,
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::TaskNotFound(_)
            | Error::Parse(_) => exit_codes::USER_ERROR,

            Error::Storage { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::Internal(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation(message)
            | Error::InvalidArgument(message)
            | Error::InvalidConfig(message)
            | Error::Parse(message)
            | Error::Internal(message) => Some(serde_json::json!({ "message": message })),
            Error::TaskNotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::Storage { operation, message } => Some(serde_json::json!({
                "operation": operation,
                "message": message,
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) | Error::TomlSerialize(_) => None,
        }
    }
}

/// Result type alias for todomaster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
