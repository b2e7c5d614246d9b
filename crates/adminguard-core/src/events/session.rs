//! Session lifecycle events emitted by the session manager.

use serde::{Deserialize, Serialize};

/// Why the timeout supervisor ended an admin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    /// No tracked activity for longer than the inactivity timeout.
    Inactivity,
    /// The session outlived the maximum session duration.
    MaxDuration,
}

impl std::fmt::Display for ExpiryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpiryReason::Inactivity => write!(f, "inactivity"),
            ExpiryReason::MaxDuration => write!(f, "max_duration"),
        }
    }
}

/// Events related to the admin session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A user signed in and identity resolution finished.
    SignedIn {
        /// Whether the user resolved as an admin.
        is_admin: bool,
    },
    /// The admin session was ended by the timeout supervisor.
    Expired {
        /// Which limit was exceeded.
        reason: ExpiryReason,
    },
    /// A background check found the admin blocked; the session was ended.
    Blocked,
    /// The user logged out explicitly.
    LoggedOut,
}
