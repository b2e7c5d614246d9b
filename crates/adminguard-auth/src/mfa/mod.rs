//! Email-code multi-factor challenge for admin sign-in.

pub mod error;
pub mod flow;

pub use error::MfaError;
pub use flow::{MfaChallenge, MfaChallengeFlow, MfaState, MfaVerification};
