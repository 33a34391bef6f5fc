//! Room backend seam
//!
//! Abstraction over the session's room machinery, enabling:
//! - a real SDK binding in production
//! - the in-memory homeserver in the harness
//! - recording mocks in unit tests

use async_trait::async_trait;

use super::errors::RoomResult;
use super::types::{PublicRoom, RoomId, RoomState, StateEvent, ThirdPartyInvite};

/// Asynchronous room operations provided by the session backend
///
/// Every call is a single round trip; retries and caching are the backend's
/// business, not the caller's.
#[async_trait]
pub trait RoomBackend: Send + Sync {
    /// Create a direct room seeded with a pending third-party invite and the
    /// given initial state events. Returns the new room's id.
    async fn create_direct_room(
        &self,
        invite: ThirdPartyInvite,
        initial_state: Vec<StateEvent>,
    ) -> RoomResult<RoomId>;

    /// Fetch the room's recorded state, including pending third-party invites
    async fn room_state(&self, room_id: &RoomId) -> RoomResult<RoomState>;

    /// Send a state event into the room
    async fn send_state_event(
        &self,
        room_id: &RoomId,
        event_type: &str,
        content: serde_json::Value,
        state_key: &str,
    ) -> RoomResult<()>;

    /// Leave the room
    async fn leave_room(&self, room_id: &RoomId) -> RoomResult<()>;

    /// Query the public-room directory of one server.
    ///
    /// `server` of `None` queries the session's current homeserver.
    async fn public_rooms(
        &self,
        server: Option<&str>,
        limit: u32,
        search: Option<&str>,
    ) -> RoomResult<Vec<PublicRoom>>;

    /// The session's current homeserver URL, if the session is established
    fn current_homeserver(&self) -> Option<String>;
}
