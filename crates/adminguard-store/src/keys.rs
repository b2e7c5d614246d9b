//! Key builders for every entry AdminGuard persists.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all AdminGuard keys.
const PREFIX: &str = "adminguard";

// ── Session keys ───────────────────────────────────────────

/// Key for the admin session-start marker (epoch milliseconds as a string).
pub fn session_start() -> String {
    format!("{PREFIX}:session:start")
}

// ── Settings keys ──────────────────────────────────────────

/// Key for the cached timeout settings blob (JSON).
pub fn timeout_settings() -> String {
    format!("{PREFIX}:settings:timeouts")
}

/// Whether a key belongs to AdminGuard.
pub fn is_owned(key: &str) -> bool {
    key.strip_prefix(PREFIX)
        .is_some_and(|rest| rest.starts_with(':'))
}
