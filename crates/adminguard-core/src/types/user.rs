//! Identity records.

use serde::{Deserialize, Serialize};

/// The signed-in identity as reported by the backend's auth client.
///
/// Carries no privilege information; admin rights are always resolved
/// separately against the account table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Backend user identifier.
    pub id: String,
    /// Email address the user signed in with, if any.
    pub email: Option<String>,
}

impl AuthUser {
    /// Create a user record.
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }

    /// The email to use for backend lookups; empty when absent.
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}

/// A row of the backend account table, matched by exact email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account email.
    pub email: String,
    /// Whether the account holds admin privilege.
    #[serde(default)]
    pub is_admin: bool,
    /// Whether the account has been blocked by another admin.
    #[serde(default)]
    pub is_blocked: bool,
}

/// Normalize an email for lookups and challenge binding: trimmed, lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
