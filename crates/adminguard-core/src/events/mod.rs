//! Events flowing into and out of the admin session lifecycle.
//!
//! [`AuthEvent`]s are published by the backend's auth client (sign-in,
//! sign-out). [`SessionEvent`]s are emitted by the session manager and
//! consumed by the embedding UI (expiry banners, blocked notices).

pub mod auth;
pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use auth::AuthEvent;
pub use session::{ExpiryReason, SessionEvent};

/// Wrapper for session events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user the event concerns (if any).
    pub user_id: Option<String>,
    /// The event payload.
    pub payload: SessionEvent,
}

impl DomainEvent {
    /// Create a new domain event stamped with the given time.
    pub fn new(timestamp: DateTime<Utc>, user_id: Option<String>, payload: SessionEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            user_id,
            payload,
        }
    }
}
