//! Core error taxonomy
//!
//! Every failure in this layer has a defined, non-crashing outcome:
//! validation and conflict errors are reported inline and leave the
//! store unchanged; transport failures on booking submission downgrade
//! to a local-fallback commit; a broken session restore degrades to
//! logged-out.

use thiserror::Error;

use shinas_client::ClientError;

/// Core error type
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid input (no cargo type, password too short, ...)
    #[error("{0}")]
    Validation(String),

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Username already taken
    #[error("Username already taken")]
    UsernameTaken,

    /// No verification code has been issued
    #[error("No pending verification")]
    NoPendingVerification,

    /// Code does not match the most recently issued one
    #[error("Invalid or expired code")]
    CodeMismatch,

    /// Login rejected; deliberately does not say which part was wrong
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Unknown user id
    #[error("User not found: {0}")]
    NotFound(String),

    /// Operation is not available on the active backend
    #[error("Not supported by this backend: {0}")]
    Unsupported(&'static str),

    /// Password hashing/verification failed
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// Remote API error
    #[error(transparent)]
    Client(#[from] ClientError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
