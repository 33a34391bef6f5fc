//! Recording mocks for the backend seams
//!
//! Each mock answers from canned data and records the calls it saw, so unit
//! tests can assert both the outcome and the exact backend traffic.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core_account::{AccountError, AccountResult, AuthBackend, ThreePidCredentials};
use crate::core_directory::{
    DirectoryError, DirectoryResult, DiscussionFinder, DiscussionLookupResult, EmailAddress,
    Medium, ResolutionResult, ThirdPartyIdResolver, UserDirectory, UserId,
};
use crate::core_room::{
    PendingThirdPartyInvite, PublicRoom, RoomBackend, RoomError, RoomId, RoomResult, RoomState,
    StateEvent, ThirdPartyInvite,
};

/// Canned third-party identifier resolver
pub struct MockResolver {
    result: Mutex<ResolutionResult>,
    fail: Mutex<bool>,
    lookups: AtomicUsize,
}

impl MockResolver {
    pub fn unbound() -> Self {
        Self {
            result: Mutex::new(ResolutionResult::Unbound),
            fail: Mutex::new(false),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn bound(user_id: UserId) -> Self {
        let mock = Self::unbound();
        *mock.result.lock().unwrap() = ResolutionResult::Bound(user_id);
        mock
    }

    pub fn failing() -> Self {
        let mock = Self::unbound();
        *mock.fail.lock().unwrap() = true;
        mock
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThirdPartyIdResolver for MockResolver {
    async fn lookup(
        &self,
        _address: &EmailAddress,
        _medium: Medium,
        _id_server_host: &str,
    ) -> DirectoryResult<ResolutionResult> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if *self.fail.lock().unwrap() {
            return Err(DirectoryError::LookupFailed("mock lookup failure".to_string()));
        }
        Ok(self.result.lock().unwrap().clone())
    }
}

/// Canned discussion finder
pub struct MockDiscussionFinder {
    result: Mutex<DiscussionLookupResult>,
    lookups: AtomicUsize,
}

impl MockDiscussionFinder {
    pub fn no_discussion() -> Self {
        Self {
            result: Mutex::new(DiscussionLookupResult::NoDiscussion),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn joined(room_id: RoomId) -> Self {
        let mock = Self::no_discussion();
        *mock.result.lock().unwrap() = DiscussionLookupResult::JoinedDiscussion(room_id);
        mock
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscussionFinder for MockDiscussionFinder {
    async fn find_discussion(
        &self,
        _address: &EmailAddress,
    ) -> DirectoryResult<DiscussionLookupResult> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.lock().unwrap().clone())
    }
}

/// Canned domain-policy directory
pub struct MockDirectory {
    authorized: bool,
    external: bool,
    fail_external_check: bool,
}

impl MockDirectory {
    pub fn new(authorized: bool, external: bool) -> Self {
        Self { authorized, external, fail_external_check: false }
    }

    pub fn failing_external_check() -> Self {
        Self { authorized: true, external: false, fail_external_check: true }
    }
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn is_email_authorized(&self, _address: &EmailAddress) -> DirectoryResult<bool> {
        Ok(self.authorized)
    }

    async fn is_email_bound_to_external_host(
        &self,
        _address: &EmailAddress,
    ) -> DirectoryResult<bool> {
        if self.fail_external_check {
            return Err(DirectoryError::PolicyCheckFailed("mock policy failure".to_string()));
        }
        Ok(self.external)
    }
}

/// A state event a mock backend saw go out
#[derive(Debug, Clone)]
pub struct SentStateEvent {
    pub room_id: RoomId,
    pub event_type: String,
    pub state_key: String,
    pub content: serde_json::Value,
}

#[derive(Default)]
struct MockRoomState {
    rooms: HashMap<RoomId, RoomState>,
    created: Vec<RoomId>,
    left: Vec<RoomId>,
    sent_state_events: Vec<SentStateEvent>,
    public: HashMap<String, Vec<PublicRoom>>,
    default_public: Vec<PublicRoom>,
    failing_servers: HashSet<String>,
    current_homeserver: Option<String>,
    fail_send_state_event: bool,
    next_room: usize,
}

/// Recording room backend answering from in-memory tables
pub struct MockRoomBackend {
    state: Mutex<MockRoomState>,
}

impl MockRoomBackend {
    pub fn new() -> Self {
        Self { state: Mutex::new(MockRoomState::default()) }
    }

    /// Register an existing room, typically one holding a pending invite
    pub fn insert_room(&self, room: RoomState) {
        let mut state = self.state.lock().unwrap();
        state.rooms.insert(room.room_id.clone(), room);
    }

    pub fn set_public_rooms(&self, server: &str, rooms: Vec<PublicRoom>) {
        self.state.lock().unwrap().public.insert(server.to_string(), rooms);
    }

    /// Chunk returned when queried with `server = None`
    pub fn set_default_public_rooms(&self, rooms: Vec<PublicRoom>) {
        self.state.lock().unwrap().default_public = rooms;
    }

    pub fn fail_server(&self, server: &str) {
        self.state.lock().unwrap().failing_servers.insert(server.to_string());
    }

    pub fn set_current_homeserver(&self, url: &str) {
        self.state.lock().unwrap().current_homeserver = Some(url.to_string());
    }

    pub fn fail_send_state_event(&self) {
        self.state.lock().unwrap().fail_send_state_event = true;
    }

    pub fn created_rooms(&self) -> Vec<RoomId> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn left_rooms(&self) -> Vec<RoomId> {
        self.state.lock().unwrap().left.clone()
    }

    pub fn sent_state_events(&self) -> Vec<SentStateEvent> {
        self.state.lock().unwrap().sent_state_events.clone()
    }
}

impl Default for MockRoomBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomBackend for MockRoomBackend {
    async fn create_direct_room(
        &self,
        invite: ThirdPartyInvite,
        initial_state: Vec<StateEvent>,
    ) -> RoomResult<RoomId> {
        let mut state = self.state.lock().unwrap();
        state.next_room += 1;
        let room_id = RoomId::new(format!("!mock-{}:mock.example.org", state.next_room));
        let token = format!("tok-{}", state.next_room);

        let room = RoomState {
            room_id: room_id.clone(),
            is_direct: true,
            events: initial_state,
            third_party_invites: vec![PendingThirdPartyInvite { invite, token }],
        };
        state.rooms.insert(room_id.clone(), room);
        state.created.push(room_id.clone());
        Ok(room_id)
    }

    async fn room_state(&self, room_id: &RoomId) -> RoomResult<RoomState> {
        let state = self.state.lock().unwrap();
        state
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))
    }

    async fn send_state_event(
        &self,
        room_id: &RoomId,
        event_type: &str,
        content: serde_json::Value,
        state_key: &str,
    ) -> RoomResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_send_state_event {
            return Err(RoomError::StateEventRejected("mock rejection".to_string()));
        }
        if !state.rooms.contains_key(room_id) {
            return Err(RoomError::RoomNotFound(room_id.clone()));
        }
        state.sent_state_events.push(SentStateEvent {
            room_id: room_id.clone(),
            event_type: event_type.to_string(),
            state_key: state_key.to_string(),
            content,
        });
        Ok(())
    }

    async fn leave_room(&self, room_id: &RoomId) -> RoomResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.rooms.remove(room_id).is_none() {
            return Err(RoomError::RoomNotFound(room_id.clone()));
        }
        state.left.push(room_id.clone());
        Ok(())
    }

    async fn public_rooms(
        &self,
        server: Option<&str>,
        _limit: u32,
        _search: Option<&str>,
    ) -> RoomResult<Vec<PublicRoom>> {
        let state = self.state.lock().unwrap();
        match server {
            Some(server) => {
                if state.failing_servers.contains(server) {
                    return Err(RoomError::Backend(format!("mock failure for {server}")));
                }
                Ok(state.public.get(server).cloned().unwrap_or_default())
            }
            None => Ok(state.default_public.clone()),
        }
    }

    fn current_homeserver(&self) -> Option<String> {
        self.state.lock().unwrap().current_homeserver.clone()
    }
}

/// Canned auth backend for registration tests
pub struct MockAuthBackend {
    sid: String,
    registrations: Mutex<Vec<(String, String)>>,
    token_requests: AtomicUsize,
}

impl MockAuthBackend {
    pub fn new() -> Self {
        Self {
            sid: "sid-mock-1".to_string(),
            registrations: Mutex::new(Vec::new()),
            token_requests: AtomicUsize::new(0),
        }
    }

    pub fn token_request_count(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> Vec<(String, String)> {
        self.registrations.lock().unwrap().clone()
    }
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn request_email_token(
        &self,
        _address: &EmailAddress,
        _client_secret: &str,
        _send_attempt: u32,
    ) -> AccountResult<String> {
        self.token_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.sid.clone())
    }

    async fn register_with_three_pid(
        &self,
        credentials: &ThreePidCredentials,
        _password: &str,
        device_display_name: &str,
    ) -> AccountResult<UserId> {
        if credentials.sid.is_empty() {
            return Err(AccountError::RegistrationFailed("missing session id".to_string()));
        }
        self.registrations
            .lock()
            .unwrap()
            .push((credentials.sid.clone(), device_display_name.to_string()));
        Ok(UserId::new("@registered:mock.example.org"))
    }
}
