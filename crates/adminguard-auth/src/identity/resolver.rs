//! Resolves whether an email belongs to an active admin account.
//!
//! Authorization fails closed: every lookup error, missing record, or
//! malformed response resolves to "not an admin". Errors are logged and
//! never raised, except by [`IdentityResolver::is_blocked`] whose caller
//! decides what a failed lookup means.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use adminguard_core::result::AppResult;
use adminguard_core::traits::backend::{Backend, functions};

/// Outcome of resolving a signed-in user's email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityResolution {
    /// Admin and not blocked.
    pub is_admin: bool,
    /// The account record carries the admin flag, blocked or not.
    pub has_admin_email: bool,
}

impl IdentityResolution {
    /// Resolution for an unknown or unresolvable identity.
    pub const NONE: Self = Self {
        is_admin: false,
        has_admin_email: false,
    };
}

/// Looks up admin and blocked flags through the backend.
#[derive(Clone)]
pub struct IdentityResolver {
    /// Backend client.
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish()
    }
}

impl IdentityResolver {
    /// Creates a resolver over the given backend.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Whether the account table marks `email` as an admin.
    pub async fn check_admin_status(&self, email: &str) -> bool {
        if email.trim().is_empty() {
            return false;
        }

        match self.backend.find_account(email).await {
            Ok(Some(record)) => record.is_admin,
            Ok(None) => {
                debug!(email = %email, "No account record for email");
                false
            }
            Err(e) => {
                warn!(email = %email, error = %e, "Admin status lookup failed");
                false
            }
        }
    }

    /// Whether the `check-admin-status` remote function reports `email`
    /// as an admin.
    pub async fn is_email_admin(&self, email: &str) -> bool {
        let response = match self
            .backend
            .invoke(functions::CHECK_ADMIN_STATUS, json!({ "email": email }))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(email = %email, error = %e, "check-admin-status invocation failed");
                return false;
            }
        };

        if let Some(error) = response.get("error") {
            warn!(email = %email, error = %error, "check-admin-status returned an error");
            return false;
        }

        match response.get("is_admin").and_then(serde_json::Value::as_bool) {
            Some(is_admin) => is_admin,
            None => {
                warn!(email = %email, "check-admin-status returned a malformed response");
                false
            }
        }
    }

    /// Resolve the admin flags for a signed-in user's email.
    ///
    /// A blocked admin keeps `has_admin_email` but loses `is_admin`.
    pub async fn resolve(&self, email: &str) -> IdentityResolution {
        if email.trim().is_empty() {
            return IdentityResolution::NONE;
        }

        match self.backend.find_account(email).await {
            Ok(Some(record)) => IdentityResolution {
                is_admin: record.is_admin && !record.is_blocked,
                has_admin_email: record.is_admin,
            },
            Ok(None) => IdentityResolution::NONE,
            Err(e) => {
                warn!(email = %email, error = %e, "Identity resolution failed");
                IdentityResolution::NONE
            }
        }
    }

    /// Raw blocked flag for `email`; `None` when no record exists.
    pub async fn is_blocked(&self, email: &str) -> AppResult<Option<bool>> {
        let record = self.backend.find_account(email).await?;
        Ok(record.map(|r| r.is_blocked))
    }
}
