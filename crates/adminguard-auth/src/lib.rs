//! # adminguard-auth
//!
//! Admin authorization lifecycle for the AdminGuard client: who is signed
//! in, whether they are an active admin right now, and when their session
//! must end.
//!
//! ## Modules
//!
//! - `identity`: admin and blocked-flag resolution against the backend
//! - `session`: published session state, activity, timeouts, blocked checks
//! - `mfa`: email-code challenge for admin sign-in
//! - `settings`: loading and saving the admin-editable timeout limits

pub mod identity;
pub mod mfa;
pub mod session;
pub mod settings;

pub use identity::{IdentityResolution, IdentityResolver};
pub use mfa::{MfaChallengeFlow, MfaError, MfaState, MfaVerification};
pub use session::{AdminSessionManager, SessionDeps, SessionSnapshot, SessionState};
pub use settings::{SecuritySettings, TimeoutSettingsService};
