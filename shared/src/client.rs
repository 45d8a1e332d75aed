//! Client-related types shared between the HTTP client and the core
//!
//! Request/response types for the auth API plus the persisted bearer
//! token pair. Wire casing is camelCase to match the hosted API.

use serde::{Deserialize, Serialize};

use crate::models::User;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub display_name: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Email verification request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

/// Profile update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Login response data: bearer token pair plus the user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

// =============================================================================
// Bearer tokens
// =============================================================================

/// Opaque access/refresh token pair issued by the hosted API.
///
/// Persisted independently of the session snapshot (longer-lived). The
/// tokens are opaque to this client except for the standard JWT `exp`
/// claim, which is peeked at to skip restore attempts that are certain
/// to fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    /// Expiry of the access token as a unix timestamp, if it parses as a
    /// JWT carrying an `exp` claim.
    pub fn access_expires_at(&self) -> Option<u64> {
        parse_jwt_exp(&self.access)
    }

    /// Whether the access token is already expired. Unparseable tokens
    /// are treated as live; the backend is the authority either way.
    pub fn is_access_expired(&self, now_secs: u64) -> bool {
        match self.access_expires_at() {
            Some(exp) => now_secs > exp,
            None => false,
        }
    }
}

/// Extract the `exp` claim (unix timestamp) from a JWT without
/// verifying it.
fn parse_jwt_exp(token: &str) -> Option<u64> {
    // JWT layout: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).ok()?;
    payload.get("exp")?.as_u64()
}
