//! MFA failures with their user-facing messages.

use thiserror::Error;

/// Why an MFA step failed. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MfaError {
    /// The email is not an admin and the site does not require sign-in.
    #[error("This email is not authorized for admin access.")]
    NotAuthorized,

    /// The code could not be issued.
    #[error("{0}")]
    Issue(String),

    /// Verification was attempted without an issued code.
    #[error("No MFA session found. Please request a new code.")]
    NoSession,

    /// The verification endpoint rejected the request outright.
    #[error("Incorrect verification code. Please try again.")]
    IncorrectCode,

    /// The code was wrong or expired.
    #[error("Invalid verification code. Please try again.")]
    InvalidCode,

    /// Any other verification failure. The backend text is logged, never shown.
    #[error("Verification failed. Please request a new code and try again.")]
    VerificationFailed,
}

impl MfaError {
    /// Classify a verification failure message from the backend.
    pub fn from_verification_failure(message: &str) -> Self {
        if message.contains("non-2xx") {
            Self::IncorrectCode
        } else if message.contains("Invalid verification code") {
            Self::InvalidCode
        } else {
            Self::VerificationFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            MfaError::from_verification_failure("Edge Function returned a non-2xx status code"),
            MfaError::IncorrectCode
        );
        assert_eq!(
            MfaError::from_verification_failure("Invalid verification code"),
            MfaError::InvalidCode
        );
        assert_eq!(
            MfaError::from_verification_failure("connection reset"),
            MfaError::VerificationFailed
        );
    }

    #[test]
    fn test_messages() {
        assert!(MfaError::NotAuthorized.to_string().contains("not authorized"));
        assert!(MfaError::NoSession.to_string().contains("No MFA session found."));
        assert!(
            !MfaError::from_verification_failure("relation \"codes\" does not exist")
                .to_string()
                .contains("codes")
        );
    }
}
