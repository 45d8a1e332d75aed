//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response reached the server (connection refused, timeout, DNS)
    #[error("Connection failed: {0}")]
    Unreachable(String),

    /// HTTP request failed after a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether this failure happened below the HTTP layer: the request
    /// never produced a status code. Only these failures are eligible
    /// for the local-fallback booking commit; an HTTP-level rejection is
    /// an authoritative answer and is never masked.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Http(e) => e.status().is_none() && !e.is_decode(),
            _ => false,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
