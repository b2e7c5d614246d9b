//! Auth state notifications published by the backend.

use serde::{Deserialize, Serialize};

use crate::types::user::AuthUser;

/// A change in the backend's auth state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "user")]
pub enum AuthEvent {
    /// A user signed in (or an existing session was restored).
    SignedIn(AuthUser),
    /// The session's tokens were refreshed; identity is unchanged.
    TokenRefreshed(AuthUser),
    /// The user signed out or the session was revoked.
    SignedOut,
}
