//! Error types for the invite flow

use thiserror::Error;

use crate::core_directory::DirectoryError;
use crate::core_room::RoomError;

/// Result type for invite operations
pub type InviteResult<T> = Result<T, InviteError>;

/// Errors surfacing from an invitation attempt
///
/// Directory and room failures propagate verbatim. `Unknown` is the
/// catch-all for absent preconditions: no resolvable identity-server host,
/// or a revocation target the session no longer knows.
#[derive(Debug, Error)]
pub enum InviteError {
    /// A required precondition was absent
    #[error("Invite preconditions not met")]
    Unknown,

    /// Propagated directory failure
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Propagated room-backend failure
    #[error(transparent)]
    Room(#[from] RoomError),
}
