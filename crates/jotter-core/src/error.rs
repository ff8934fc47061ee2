//! Error types for jotter.

use thiserror::Error;

/// Result type alias using jotter's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for jotter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found, not owned by the caller, or in the wrong state.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unique username / email address already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Login or password re-verification failed
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Session token missing, malformed, expired or forged
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Internal(e.to_string())
    }
}
