//! Core error types for gritlock-core.
//!
//! None of these errors ever stop a running session. The controller logs
//! collaborator failures and keeps counting down; the CLI surfaces the rest.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for gritlock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// App shield errors
    #[error("Shield error: {0}")]
    Shield(#[from] ShieldError),

    /// Screen-time authorization errors
    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The session actor has shut down
    #[error("Session runtime is no longer running")]
    ChannelClosed,

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Dot-path key does not name a configuration field
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors from the SQLite key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Errors raised by an [`AppShield`](crate::shield::AppShield).
#[derive(Error, Debug)]
pub enum ShieldError {
    /// Screen-time access has not been granted
    #[error("Screen Time access is not authorized")]
    NotAuthorized,

    /// The backing shield store failed
    #[error("Shield store failed: {0}")]
    Store(#[from] StorageError),

    /// The app set could not be encoded for the store
    #[error("Failed to encode app set: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised by an [`AuthorizationProvider`](crate::shield::AuthorizationProvider).
#[derive(Error, Debug)]
pub enum AuthorizationError {
    /// The user declined access
    #[error("Screen Time authorization was denied")]
    Denied,

    /// The request could not be completed
    #[error("Screen Time authorization failed: {0}")]
    Failed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
