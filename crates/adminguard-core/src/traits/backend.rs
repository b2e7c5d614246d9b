//! The managed data backend, seen as a black-box client.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::events::AuthEvent;
use crate::result::AppResult;
use crate::types::settings::SecuritySettingsRecord;
use crate::types::user::{AccountRecord, AuthUser};

/// Names of the remote functions the session lifecycle invokes.
pub mod functions {
    /// `{ email }` → `{ is_admin }` or `{ error }`.
    pub const CHECK_ADMIN_STATUS: &str = "check-admin-status";
    /// `{ email, actionType, actionData }` → `{ codeId, expiresAt }` or `{ error }`.
    pub const SEND_VERIFICATION_CODE: &str = "send-verification-code";
    /// `{ codeId, code }` → `{ success }` or `{ error }`.
    pub const VERIFY_CODE: &str = "verify-code";
}

/// Client for the auth service, account table, settings row and remote
/// functions of the backing store.
///
/// Implementations report transport and HTTP failures as `Err`. For
/// [`Backend::invoke`] the error message carries the backend's own error
/// text (e.g. "Edge Function returned a non-2xx status code") so callers can
/// classify it.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// The user of the session the auth client currently holds, if any.
    async fn current_session(&self) -> AppResult<Option<AuthUser>>;

    /// Ends the current auth session.
    async fn sign_out(&self) -> AppResult<()>;

    /// Subscribe to sign-in/sign-out notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// Look up an account row by exact email match.
    async fn find_account(&self, email: &str) -> AppResult<Option<AccountRecord>>;

    /// Read the security settings row.
    async fn fetch_security_settings(&self) -> AppResult<Option<SecuritySettingsRecord>>;

    /// Upsert the security settings row.
    async fn save_security_settings(&self, record: &SecuritySettingsRecord) -> AppResult<()>;

    /// Invoke a remote function with a JSON body and return its JSON response.
    async fn invoke(
        &self,
        function: &str,
        body: serde_json::Value,
    ) -> AppResult<serde_json::Value>;

    /// Lightweight keep-alive round trip.
    async fn heartbeat(&self) -> AppResult<()>;
}
