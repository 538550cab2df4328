//! Error types for taskman
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, duplicates, unknown user or task)
//! - 3: Blocked by policy (not admin, bad credentials, task already complete)
//! - 4: Operation failed (storage or serialization error)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskman CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const POLICY_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskman operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("{0} cannot be blank")]
    BlankField(String),

    #[error("{0} cannot consist of only numbers")]
    NumericField(String),

    #[error("A task titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("User '{0}' already exists")]
    DuplicateUsername(String),

    #[error("User '{0}' is not registered")]
    UnknownUser(String),

    #[error("Task index {index} is out of range ({len} tasks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid date '{0}': expected DD Mon YYYY (e.g. 07 Mar 2001)")]
    InvalidDateFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Policy blocks (exit code 3)
    #[error("Only the admin user may {0}")]
    Forbidden(String),

    #[error("Invalid username or password")]
    AuthenticationFailed,

    #[error("Task {0} is complete and can no longer be changed")]
    TaskAlreadyComplete(usize),

    // Operation failures (exit code 4)
    #[error("Failed to write {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::BlankField(_)
            | Error::NumericField(_)
            | Error::DuplicateTitle(_)
            | Error::DuplicateUsername(_)
            | Error::UnknownUser(_)
            | Error::IndexOutOfRange { .. }
            | Error::InvalidDateFormat(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            // Policy blocks
            Error::Forbidden(_) | Error::AuthenticationFailed | Error::TaskAlreadyComplete(_) => {
                exit_codes::POLICY_BLOCKED
            }

            // Operation failures
            Error::StorageWrite { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Exit-code class as a stable name
    pub fn kind(&self) -> &'static str {
        match self.exit_code() {
            exit_codes::USER_ERROR => "user_error",
            exit_codes::POLICY_BLOCKED => "policy_blocked",
            _ => "operation_failed",
        }
    }

    /// Structured details for errors that carry fields
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::IndexOutOfRange { index, len } => Some(serde_json::json!({
                "index": index,
                "len": len,
            })),
            Error::TaskAlreadyComplete(index) => Some(serde_json::json!({ "index": index })),
            Error::DuplicateTitle(title) => Some(serde_json::json!({ "title": title })),
            Error::DuplicateUsername(name) | Error::UnknownUser(name) => {
                Some(serde_json::json!({ "username": name }))
            }
            Error::BlankField(field) | Error::NumericField(field) => {
                Some(serde_json::json!({ "field": field }))
            }
            Error::InvalidDateFormat(raw) => Some(serde_json::json!({ "input": raw })),
            Error::StorageWrite { path, .. } => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            Error::InvalidConfig(message) => Some(serde_json::json!({ "message": message })),
            _ => None,
        }
    }
}

/// Result type alias for taskman operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error body of the `--json` error envelope
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub message: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            message: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
