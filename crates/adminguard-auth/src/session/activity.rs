//! Last user activity tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

use adminguard_core::clock::Clock;

/// Tracks when the user was last active.
///
/// The timestamp only moves forward, so recording from many event sources
/// at any rate is safe.
#[derive(Debug)]
pub struct ActivityTracker {
    /// Epoch milliseconds of the last recorded activity.
    last_activity_ms: AtomicI64,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl ActivityTracker {
    /// Create a tracker whose last activity is "now".
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            last_activity_ms: AtomicI64::new(clock.now_millis()),
            clock,
        }
    }

    /// Record activity at the current time.
    pub fn record(&self) {
        self.record_at(self.clock.now());
    }

    /// Record activity at a specific instant. Earlier instants are ignored.
    pub fn record_at(&self, at: DateTime<Utc>) {
        self.last_activity_ms
            .fetch_max(at.timestamp_millis(), Ordering::AcqRel);
    }

    /// Last recorded activity.
    pub fn last_activity(&self) -> DateTime<Utc> {
        let millis = self.last_activity_ms.load(Ordering::Acquire);
        DateTime::from_timestamp_millis(millis).unwrap_or_default()
    }

    /// Time elapsed since the last recorded activity.
    pub fn idle_for(&self) -> chrono::Duration {
        self.clock.now() - self.last_activity()
    }
}
