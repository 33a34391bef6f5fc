//! Error types for account operations

use thiserror::Error;

/// Result type for account operations
pub type AccountResult<T> = Result<T, AccountError>;

/// Errors that can occur during registration
#[derive(Debug, Error)]
pub enum AccountError {
    /// No identity server host could be resolved from the configuration
    #[error("No identity server configured")]
    MissingIdentityServer,

    /// The verification email could not be issued
    #[error("Email verification failed: {0}")]
    EmailVerificationFailed(String),

    /// The homeserver rejected the registration
    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    /// Transport-level failure reported by the backend
    #[error("Auth backend error: {0}")]
    Backend(String),
}
