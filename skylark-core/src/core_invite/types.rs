//! Invite flow value types

use crate::core_directory::UserId;
use crate::core_room::RoomId;

/// Terminal outcome of one invitation attempt
///
/// Exactly one of these is produced per attempt; the flow never partially
/// completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    /// A new discussion was created and the invite went out
    Sent {
        /// The freshly created discussion
        room_id: RoomId,
    },

    /// The address already belongs to an account; invite the user directly
    /// instead of going through email
    IgnoredForDiscoveredUser {
        /// The discovered account
        user_id: UserId,
    },

    /// The address's domain may not receive invites
    IgnoredForUnauthorizedEmail,

    /// An invite for this address is already pending in an existing
    /// discussion; nothing was re-sent
    AlreadySent {
        /// The existing discussion
        room_id: RoomId,
    },
}
