//! Session supervision configuration.
//!
//! These are deployment knobs (cadences, routes). The admin-editable
//! timeout limits live in [`crate::types::settings::TimeoutSettings`].

use serde::{Deserialize, Serialize};

/// Session supervision configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How often the timeout supervisor checks the session, in seconds.
    #[serde(default = "default_supervisor_interval")]
    pub supervisor_interval_seconds: u64,
    /// Minimum spacing between two background blocked-status checks.
    #[serde(default = "default_blocked_cooldown")]
    pub blocked_check_cooldown_seconds: u64,
    /// Route the navigator is sent to on logout or when blocked.
    #[serde(default = "default_login_route")]
    pub login_route: String,
    /// Capacity of the session event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            supervisor_interval_seconds: default_supervisor_interval(),
            blocked_check_cooldown_seconds: default_blocked_cooldown(),
            login_route: default_login_route(),
            event_channel_capacity: default_event_capacity(),
        }
    }
}

fn default_supervisor_interval() -> u64 {
    30
}

fn default_blocked_cooldown() -> u64 {
    60
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_event_capacity() -> usize {
    64
}
