//! Core error types for setminder-core.
//!
//! One thiserror hierarchy: `CoreError` at the top, with focused sub-enums
//! per concern. Storage errors are retried by the scheduler loop, transition
//! errors surface synchronously to the caller, notification errors are
//! logged and swallowed.

use std::path::PathBuf;
use thiserror::Error;

use crate::workout::SetState;

/// Core error type for setminder-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage backend errors
    #[error("storage error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rejected set-state transitions
    #[error("transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Notification delivery errors
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open the database -- fatal to the current tick, retried on
    /// the next scheduled invocation.
    #[error("failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A stored workout record could not be decoded
    #[error("stored workout for {date} is corrupt: {source}")]
    Corrupt {
        date: String,
        #[source]
        source: serde_json::Error,
    },

    /// Database is locked by another writer
    #[error("database is locked")]
    Locked,
}

/// An action was requested against a set not in an eligible state.
///
/// Reported to the caller; no mutation is applied.
#[derive(Error, Debug)]
pub enum TransitionError {
    #[error("set {id} cannot {action} while {state}")]
    InvalidTransition {
        id: usize,
        state: SetState,
        action: &'static str,
    },

    #[error("no set with id {id} (day has {len} sets)")]
    UnknownSet { id: usize, len: usize },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Notification delivery failed at the backend.
///
/// Never fatal: the scheduler logs it and carries on.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification backend failed: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
