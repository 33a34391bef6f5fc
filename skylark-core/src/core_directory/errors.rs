//! Error types for directory operations

use thiserror::Error;

/// Result type for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur when talking to the identity server or the
/// homeserver directory API
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The address is not a usable third-party identifier
    #[error("Invalid third-party address: {0}")]
    InvalidAddress(String),

    /// The identity server rejected or failed the lookup
    #[error("Identity lookup failed: {0}")]
    LookupFailed(String),

    /// The homeserver policy endpoint failed
    #[error("Directory policy check failed: {0}")]
    PolicyCheckFailed(String),

    /// Transport-level failure reported by the backend
    #[error("Directory backend error: {0}")]
    Backend(String),
}
