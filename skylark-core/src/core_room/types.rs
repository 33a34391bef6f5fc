//! Room value types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_directory::{EmailAddress, Medium};

/// Unique identifier for a room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        RoomId(id.into())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A state event recorded in a room
///
/// `content` stays an untyped JSON value: the set of event types is open and
/// forward compatibility matters more than static typing here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEvent {
    /// Event type identifier
    pub event_type: String,

    /// State key (empty for room-wide events)
    pub state_key: String,

    /// Event content
    pub content: serde_json::Value,

    /// Server-side origination timestamp, milliseconds since epoch
    pub origin_server_ts: u64,
}

/// Seed for a third-party invite sent at room creation
///
/// Mirrors what the backend puts on the wire: no token yet, the server mints
/// one when the invite lands in room state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPartyInvite {
    /// Identifier medium
    pub medium: Medium,

    /// Invitee address
    pub address: EmailAddress,

    /// Identity server host that will vouch for the binding
    pub id_server_host: String,
}

/// A third-party invite pending in a room's state
///
/// Created by the backend at room creation; destroyed by the invite flow
/// when a stale external invite has to be replaced. The token is the handle
/// used for revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingThirdPartyInvite {
    /// The invite as originally sent
    pub invite: ThirdPartyInvite,

    /// Revocation token minted by the server
    pub token: String,
}

/// A room's recorded state, as far as the client cares
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomState {
    /// The room this state belongs to
    pub room_id: RoomId,

    /// Whether the room is a direct 1:1 chat
    pub is_direct: bool,

    /// State events, in scan order
    pub events: Vec<StateEvent>,

    /// Outstanding third-party invites
    pub third_party_invites: Vec<PendingThirdPartyInvite>,
}

/// One entry of a public-room directory response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicRoom {
    /// Room identifier
    pub room_id: RoomId,

    /// Display name, if the room advertises one
    pub name: Option<String>,

    /// Topic, if the room advertises one
    pub topic: Option<String>,

    /// Joined member count as reported by the server
    pub num_joined_members: u64,

    /// Whether history is readable without joining
    pub world_readable: bool,
}
