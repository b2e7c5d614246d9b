//! Throttled background check of the signed-in account's blocked flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tracing::{debug, warn};

use adminguard_core::clock::Clock;

use crate::identity::IdentityResolver;

/// Sentinel for "never checked".
const NEVER: i64 = i64::MIN;

/// Outcome of [`BlockedStatusPoller::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedCheck {
    /// Skipped: another check ran within the cooldown.
    Throttled,
    /// The account is not blocked, or has no record.
    Clear,
    /// The account is blocked.
    Blocked,
    /// The lookup failed; treated as not blocked.
    Failed,
}

/// Runs at most one blocked-flag lookup per cooldown window.
#[derive(Debug)]
pub struct BlockedStatusPoller {
    /// Identity lookups.
    resolver: IdentityResolver,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Minimum spacing between two lookups, in milliseconds.
    cooldown_ms: i64,
    /// Epoch milliseconds of the last claimed check.
    last_checked_ms: AtomicI64,
}

impl BlockedStatusPoller {
    /// Create a poller with the given cooldown.
    pub fn new(resolver: IdentityResolver, clock: Arc<dyn Clock>, cooldown_seconds: u64) -> Self {
        let cooldown_ms = i64::try_from(cooldown_seconds.saturating_mul(1_000)).unwrap_or(i64::MAX);
        Self {
            resolver,
            clock,
            cooldown_ms,
            last_checked_ms: AtomicI64::new(NEVER),
        }
    }

    /// Claim the check slot for the current window.
    ///
    /// The slot is taken with a compare-and-swap, so of any number of
    /// concurrent callers at most one wins per window.
    pub fn try_claim(&self) -> bool {
        let now = self.clock.now_millis();
        let last = self.last_checked_ms.load(Ordering::Acquire);

        if last != NEVER && now.saturating_sub(last) < self.cooldown_ms {
            return false;
        }

        self.last_checked_ms
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Look up the blocked flag for `email` unless throttled.
    pub async fn check(&self, email: &str) -> BlockedCheck {
        if !self.try_claim() {
            debug!("Blocked status check throttled");
            return BlockedCheck::Throttled;
        }

        match self.resolver.is_blocked(email).await {
            Ok(Some(true)) => BlockedCheck::Blocked,
            Ok(_) => BlockedCheck::Clear,
            Err(e) => {
                warn!(email = %email, error = %e, "Blocked status check failed");
                BlockedCheck::Failed
            }
        }
    }
}
