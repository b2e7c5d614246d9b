//! Issue and verify a short-lived email code bound to an admin sign-in.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::watch;
use tracing::{info, warn};

use adminguard_core::traits::backend::{Backend, functions};
use adminguard_core::types::user::normalize_email;

use crate::identity::IdentityResolver;
use crate::session::state::Published;

use super::error::MfaError;

/// Action the issued code authorizes.
const ACTION_ADMIN_LOGIN: &str = "admin_login";

/// An issued, not yet verified code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaChallenge {
    /// Backend identifier of the issued code.
    pub code_id: String,
    /// Normalized email the code was sent to.
    pub email: String,
}

/// Where the flow is.
///
/// `Idle → CodeRequested → (CodeSent | Rejected)`, then
/// `CodeSent → Verifying → (VerifiedAdmin | VerifiedNonAdmin | Failed)`.
/// `Rejected` and `Failed` hold until [`MfaChallengeFlow::reset`] returns
/// the flow to `Idle` or a new code request restarts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MfaState {
    Idle,
    CodeRequested,
    CodeSent,
    Rejected,
    Verifying,
    VerifiedAdmin,
    VerifiedNonAdmin,
    Failed,
}

/// Successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MfaVerification {
    /// The verified, normalized email.
    pub email: String,
    /// Whether the email resolved as an active admin.
    pub is_admin: bool,
}

/// Drives one user's MFA handshake.
pub struct MfaChallengeFlow {
    backend: Arc<dyn Backend>,
    resolver: IdentityResolver,
    /// Global site-login policy.
    require_site_login: watch::Receiver<bool>,
    challenge: Mutex<Option<MfaChallenge>>,
    state: Published<MfaState>,
}

impl std::fmt::Debug for MfaChallengeFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MfaChallengeFlow")
            .field("state", &self.state.get())
            .field("pending_email", &self.pending_email())
            .finish()
    }
}

impl MfaChallengeFlow {
    /// Create an idle flow.
    pub fn new(
        backend: Arc<dyn Backend>,
        resolver: IdentityResolver,
        require_site_login: watch::Receiver<bool>,
    ) -> Self {
        Self {
            backend,
            resolver,
            require_site_login,
            challenge: Mutex::new(None),
            state: Published::new(MfaState::Idle),
        }
    }

    /// Current step.
    pub fn state(&self) -> MfaState {
        self.state.get()
    }

    /// Subscribe to step changes.
    pub fn subscribe_state(&self) -> watch::Receiver<MfaState> {
        self.state.subscribe()
    }

    /// Email of the outstanding challenge, if any.
    pub fn pending_email(&self) -> Option<String> {
        self.lock_challenge().as_ref().map(|c| c.email.clone())
    }

    /// Drop any outstanding challenge and return to `Idle`.
    pub fn reset(&self) {
        self.lock_challenge().take();
        self.state.set(MfaState::Idle);
    }

    /// Send a code to `email` and remember the challenge.
    ///
    /// Unless the site requires sign-in for everyone, only admin emails
    /// may request a code. Returns the backend code id.
    pub async fn send_mfa_code(&self, email: &str) -> Result<String, MfaError> {
        let email = normalize_email(email);
        self.state.set(MfaState::CodeRequested);

        let require_site_login = *self.require_site_login.borrow();
        if !require_site_login && !self.resolver.is_email_admin(&email).await {
            warn!(email = %email, "MFA code requested for a non-admin email");
            self.state.set(MfaState::Rejected);
            return Err(MfaError::NotAuthorized);
        }

        let body = json!({
            "email": email,
            "actionType": ACTION_ADMIN_LOGIN,
            "actionData": { "email": email },
        });

        let code_id = match self
            .backend
            .invoke(functions::SEND_VERIFICATION_CODE, body)
            .await
        {
            Ok(response) => issued_code_id(&response),
            Err(e) => Err(MfaError::Issue(e.message)),
        };

        let code_id = match code_id {
            Ok(code_id) => code_id,
            Err(e) => {
                warn!(email = %email, error = %e, "Failed to issue MFA code");
                self.state.set(MfaState::Rejected);
                return Err(e);
            }
        };

        *self.lock_challenge() = Some(MfaChallenge {
            code_id: code_id.clone(),
            email: email.clone(),
        });
        self.state.set(MfaState::CodeSent);

        info!(email = %email, code_id = %code_id, "MFA code sent");
        Ok(code_id)
    }

    /// Verify `code` against the outstanding challenge.
    ///
    /// The challenge is consumed whatever the outcome; a failed attempt
    /// needs a new code.
    pub async fn verify_mfa_code(&self, code: &str) -> Result<MfaVerification, MfaError> {
        let pending = self.lock_challenge().take();
        let Some(challenge) = pending else {
            return Err(MfaError::NoSession);
        };
        self.state.set(MfaState::Verifying);

        let body = json!({ "codeId": challenge.code_id, "code": code.trim() });
        let outcome = match self.backend.invoke(functions::VERIFY_CODE, body).await {
            Ok(response) => verification_outcome(&response),
            Err(e) => Err(e.message),
        };

        if let Err(detail) = outcome {
            let e = MfaError::from_verification_failure(&detail);
            warn!(email = %challenge.email, error = %detail, "MFA verification failed");
            self.state.set(MfaState::Failed);
            return Err(e);
        }

        let is_admin = self.resolver.resolve(&challenge.email).await.is_admin;
        self.state.set(if is_admin {
            MfaState::VerifiedAdmin
        } else {
            MfaState::VerifiedNonAdmin
        });

        info!(email = %challenge.email, is_admin, "MFA code verified");
        Ok(MfaVerification {
            email: challenge.email,
            is_admin,
        })
    }

    fn lock_challenge(&self) -> MutexGuard<'_, Option<MfaChallenge>> {
        self.challenge
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Text of an embedded `{ error }` payload.
fn error_text(response: &Value) -> Option<String> {
    response.get("error").map(|error| match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    })
}

fn issued_code_id(response: &Value) -> Result<String, MfaError> {
    if let Some(message) = error_text(response) {
        return Err(MfaError::Issue(message));
    }
    response
        .get("codeId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| MfaError::Issue("Failed to send verification code.".to_string()))
}

/// `Ok` on success, otherwise the failure detail to classify and log.
fn verification_outcome(response: &Value) -> Result<(), String> {
    if let Some(message) = error_text(response) {
        return Err(message);
    }
    match response.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        Some(false) => Err("Invalid verification code".to_string()),
        None => Err(format!("unexpected verification response: {response}")),
    }
}
