//! User Model

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role names used for authorization decisions.
///
/// Stored as plain strings; comparison is case-insensitive because the
/// hosted API and the local store disagree on casing.
pub mod role {
    pub const ADMIN: &str = "admin";
    pub const USER: &str = "user";
}

/// User account record
///
/// Owned by the account store; API responses reuse the same shape. The
/// password hash is only ever populated inside the store, snapshots and
/// listings are sanitized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(with = "serde_helpers::string_or_number")]
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub role: String,
    pub email_verified: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user holds the administrator role (case-insensitive).
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case(role::ADMIN)
    }

    /// Copy of this record with the password hash stripped.
    ///
    /// Used for session snapshots and listings so callers can never reach
    /// the stored hash.
    pub fn sanitized(&self) -> Self {
        Self {
            password_hash: None,
            ..self.clone()
        }
    }
}

/// The single outstanding email-verification code.
///
/// At most one exists process-wide; issuing a new code for any email
/// supersedes the previous record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerification {
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}
