//! Inactivity and maximum-duration supervision of admin sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use adminguard_core::events::ExpiryReason;
use adminguard_core::types::settings::TimeoutSettings;

use super::manager::AdminSessionManager;

/// Which limit, if any, a session has exceeded at `now`.
///
/// Limits are exceeded strictly: a session idle for exactly the inactivity
/// timeout is still alive. Without a known start the duration limit is not
/// checked. Inactivity is reported first when both are exceeded.
pub fn check_expiry(
    settings: &TimeoutSettings,
    now: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    session_start: Option<DateTime<Utc>>,
) -> Option<ExpiryReason> {
    if now - last_activity > settings.inactivity_timeout() {
        return Some(ExpiryReason::Inactivity);
    }

    if let Some(start) = session_start {
        if now - start > settings.max_session_duration() {
            return Some(ExpiryReason::MaxDuration);
        }
    }

    None
}

/// Periodically asks the manager to enforce the timeout limits.
#[derive(Debug)]
pub struct TimeoutSupervisor {
    /// Session manager to check.
    manager: Arc<AdminSessionManager>,
    /// Check cadence.
    interval: Duration,
}

impl TimeoutSupervisor {
    /// Create a supervisor checking every `interval_seconds`.
    pub fn new(manager: Arc<AdminSessionManager>, interval_seconds: u64) -> Self {
        Self {
            manager,
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Run until the cancel flag flips. Each check finishes before the next
    /// tick is taken.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Timeout supervisor started"
        );

        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Some(reason) = self.manager.check_timeouts().await {
                        debug!(reason = %reason, "Timeout supervisor ended the admin session");
                    }
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Timeout supervisor shutting down");
                        break;
                    }
                }
            }
        }
    }
}
