//! Error types for room operations

use thiserror::Error;

use super::types::RoomId;

/// Result type for room operations
pub type RoomResult<T> = Result<T, RoomError>;

/// Errors that can occur in room backend operations
#[derive(Debug, Error)]
pub enum RoomError {
    /// The room is not known to the session
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// Room creation was rejected
    #[error("Room creation failed: {0}")]
    CreationFailed(String),

    /// A state event could not be sent
    #[error("State event rejected: {0}")]
    StateEventRejected(String),

    /// Transport-level failure reported by the backend
    #[error("Room backend error: {0}")]
    Backend(String),
}
