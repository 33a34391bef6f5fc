//! Room state, access rules and the room backend seam
//!
//! Everything the client needs to reason about rooms without owning any
//! room machinery itself: typed state events, the access-rule policy
//! resolution, state-event builders used as creation seeds, and the
//! aggregated public-room directory.

pub mod access_rules;
mod backend;
mod errors;
pub mod public_rooms;
pub mod state;
mod types;

pub use access_rules::AccessRule;
pub use backend::RoomBackend;
pub use errors::{RoomError, RoomResult};
pub use public_rooms::PublicRoomService;
pub use types::{
    PendingThirdPartyInvite, PublicRoom, RoomId, RoomState, StateEvent, ThirdPartyInvite,
};
