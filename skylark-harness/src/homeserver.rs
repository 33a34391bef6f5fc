//! In-memory homeserver
//!
//! One struct implementing every backend seam: identity resolution,
//! discussion lookup, domain policy, rooms and registration. State lives in
//! plain tables behind one lock; every operation is lock, mutate, unlock.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use skylark_core::core_account::{AccountError, AccountResult, AuthBackend, ThreePidCredentials};
use skylark_core::core_directory::{
    DirectoryResult, DiscussionFinder, DiscussionLookupResult, EmailAddress, Medium,
    ResolutionResult, ThirdPartyIdResolver, UserDirectory, UserId,
};
use skylark_core::core_room::state::THIRD_PARTY_INVITE_EVENT_TYPE;
use skylark_core::core_room::{
    PendingThirdPartyInvite, PublicRoom, RoomBackend, RoomError, RoomId, RoomResult, RoomState,
    StateEvent, ThirdPartyInvite,
};

#[derive(Default)]
struct Tables {
    /// email -> bound account
    bound: HashMap<String, UserId>,
    /// email -> existing direct discussion
    discussions: HashMap<String, RoomId>,
    rooms: HashMap<RoomId, RoomState>,

    unauthorized_domains: HashSet<String>,
    external_domains: HashSet<String>,

    /// server name -> public rooms chunk
    public: HashMap<String, Vec<PublicRoom>>,
    /// chunk served when queried with `server = None`
    local_public: Vec<PublicRoom>,
    failing_servers: HashSet<String>,

    /// sid -> verified email, for registration
    email_sessions: HashMap<String, String>,

    fail_state_events: bool,

    created: Vec<RoomId>,
    left: Vec<RoomId>,
    revoked_tokens: Vec<String>,

    next_id: u64,
    clock_ms: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn tick(&mut self) -> u64 {
        self.clock_ms += 1;
        self.clock_ms
    }
}

/// In-memory homeserver implementing all `skylark-core` backend traits
pub struct InMemoryHomeserver {
    url: String,
    host: String,
    tables: RwLock<Tables>,
}

impl InMemoryHomeserver {
    /// Create a homeserver answering as `url`
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let host = url
            .split_once("://")
            .map_or(url.as_str(), |(_, rest)| rest)
            .split(['/', ':'])
            .next()
            .unwrap_or("localhost")
            .to_string();
        Self { url, host, tables: RwLock::new(Tables::default()) }
    }

    /// Bind an email to an existing account
    pub fn bind_email(&self, address: &EmailAddress, user_id: UserId) {
        self.tables
            .write()
            .unwrap()
            .bound
            .insert(address.as_str().to_string(), user_id);
    }

    /// Seed an existing direct discussion holding a pending invite for
    /// `address`; returns the discussion's room id
    pub fn seed_discussion(&self, address: &EmailAddress) -> RoomId {
        let mut tables = self.tables.write().unwrap();
        let seq = tables.next_id();
        let room_id = RoomId::new(format!("!seeded-{}:{}", seq, self.host));
        let token = format!("tok-{}", seq);

        tables.rooms.insert(
            room_id.clone(),
            RoomState {
                room_id: room_id.clone(),
                is_direct: true,
                events: Vec::new(),
                third_party_invites: vec![PendingThirdPartyInvite {
                    invite: ThirdPartyInvite {
                        medium: Medium::Email,
                        address: address.clone(),
                        id_server_host: self.host.clone(),
                    },
                    token,
                }],
            },
        );
        tables
            .discussions
            .insert(address.as_str().to_string(), room_id.clone());
        room_id
    }

    /// Refuse invites for a domain
    pub fn block_domain(&self, domain: &str) {
        self.tables
            .write()
            .unwrap()
            .unauthorized_domains
            .insert(domain.to_string());
    }

    /// Mark a domain as served by the external host
    pub fn mark_domain_external(&self, domain: &str) {
        self.tables
            .write()
            .unwrap()
            .external_domains
            .insert(domain.to_string());
    }

    /// Publish a public-rooms chunk for a named federated server
    pub fn publish_rooms(&self, server: &str, rooms: Vec<PublicRoom>) {
        self.tables
            .write()
            .unwrap()
            .public
            .insert(server.to_string(), rooms);
    }

    /// Publish the chunk served for the session's own homeserver
    pub fn publish_local_rooms(&self, rooms: Vec<PublicRoom>) {
        self.tables.write().unwrap().local_public = rooms;
    }

    /// Make a named server's directory queries fail
    pub fn fail_server(&self, server: &str) {
        self.tables
            .write()
            .unwrap()
            .failing_servers
            .insert(server.to_string());
    }

    /// Make state-event sends fail, for revocation-failure scenarios
    pub fn fail_state_events(&self) {
        self.tables.write().unwrap().fail_state_events = true;
    }

    /// Rooms created so far, in creation order
    pub fn created_rooms(&self) -> Vec<RoomId> {
        self.tables.read().unwrap().created.clone()
    }

    /// Rooms left so far, in leave order
    pub fn left_rooms(&self) -> Vec<RoomId> {
        self.tables.read().unwrap().left.clone()
    }

    /// Invite tokens revoked so far
    pub fn revoked_tokens(&self) -> Vec<String> {
        self.tables.read().unwrap().revoked_tokens.clone()
    }

    /// Current state of a room, if it exists
    pub fn room(&self, room_id: &RoomId) -> Option<RoomState> {
        self.tables.read().unwrap().rooms.get(room_id).cloned()
    }
}

#[async_trait]
impl ThirdPartyIdResolver for InMemoryHomeserver {
    async fn lookup(
        &self,
        address: &EmailAddress,
        _medium: Medium,
        _id_server_host: &str,
    ) -> DirectoryResult<ResolutionResult> {
        let tables = self.tables.read().unwrap();
        Ok(match tables.bound.get(address.as_str()) {
            Some(user_id) => ResolutionResult::Bound(user_id.clone()),
            None => ResolutionResult::Unbound,
        })
    }
}

#[async_trait]
impl DiscussionFinder for InMemoryHomeserver {
    async fn find_discussion(
        &self,
        address: &EmailAddress,
    ) -> DirectoryResult<DiscussionLookupResult> {
        let tables = self.tables.read().unwrap();
        Ok(match tables.discussions.get(address.as_str()) {
            Some(room_id) => DiscussionLookupResult::JoinedDiscussion(room_id.clone()),
            None => DiscussionLookupResult::NoDiscussion,
        })
    }
}

#[async_trait]
impl UserDirectory for InMemoryHomeserver {
    async fn is_email_authorized(&self, address: &EmailAddress) -> DirectoryResult<bool> {
        let tables = self.tables.read().unwrap();
        Ok(!tables.unauthorized_domains.contains(address.domain()))
    }

    async fn is_email_bound_to_external_host(
        &self,
        address: &EmailAddress,
    ) -> DirectoryResult<bool> {
        let tables = self.tables.read().unwrap();
        Ok(tables.external_domains.contains(address.domain()))
    }
}

#[async_trait]
impl RoomBackend for InMemoryHomeserver {
    async fn create_direct_room(
        &self,
        invite: ThirdPartyInvite,
        initial_state: Vec<StateEvent>,
    ) -> RoomResult<RoomId> {
        let mut tables = self.tables.write().unwrap();
        let seq = tables.next_id();
        let room_id = RoomId::new(format!("!direct-{}:{}", seq, self.host));
        let token = format!("tok-{}", seq);
        let address = invite.address.as_str().to_string();

        tables.rooms.insert(
            room_id.clone(),
            RoomState {
                room_id: room_id.clone(),
                is_direct: true,
                events: initial_state,
                third_party_invites: vec![PendingThirdPartyInvite { invite, token }],
            },
        );
        tables.discussions.insert(address, room_id.clone());
        tables.created.push(room_id.clone());
        Ok(room_id)
    }

    async fn room_state(&self, room_id: &RoomId) -> RoomResult<RoomState> {
        let tables = self.tables.read().unwrap();
        tables
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
        let mut tables = self.tables.write().unwrap();
        if tables.fail_state_events {
            return Err(RoomError::StateEventRejected("harness configured to fail".to_string()));
        }

        let ts = tables.tick();

        // An empty third-party-invite event keyed by a pending token revokes
        // that invite.
        if event_type == THIRD_PARTY_INVITE_EVENT_TYPE {
            let room = tables
                .rooms
                .get_mut(room_id)
                .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))?;
            let before = room.third_party_invites.len();
            room.third_party_invites.retain(|pending| pending.token != state_key);
            if room.third_party_invites.len() < before {
                tables.revoked_tokens.push(state_key.to_string());
                return Ok(());
            }
        }

        let room = tables
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))?;
        room.events.push(StateEvent {
            event_type: event_type.to_string(),
            state_key: state_key.to_string(),
            content,
            origin_server_ts: ts,
        });
        Ok(())
    }

    async fn leave_room(&self, room_id: &RoomId) -> RoomResult<()> {
        let mut tables = self.tables.write().unwrap();
        if tables.rooms.remove(room_id).is_none() {
            return Err(RoomError::RoomNotFound(room_id.clone()));
        }
        tables.discussions.retain(|_, discussion| *discussion != *room_id);
        tables.left.push(room_id.clone());
        Ok(())
    }

    async fn public_rooms(
        &self,
        server: Option<&str>,
        limit: u32,
        search: Option<&str>,
    ) -> RoomResult<Vec<PublicRoom>> {
        let tables = self.tables.read().unwrap();
        let mut rooms = match server {
            Some(server) => {
                if tables.failing_servers.contains(server) {
                    return Err(RoomError::Backend(format!("{} unreachable", server)));
                }
                tables.public.get(server).cloned().unwrap_or_default()
            }
            None => tables.local_public.clone(),
        };

        if let Some(needle) = search {
            let needle = needle.to_lowercase();
            rooms.retain(|room| {
                room.name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            });
        }
        rooms.truncate(limit as usize);
        Ok(rooms)
    }

    fn current_homeserver(&self) -> Option<String> {
        Some(self.url.clone())
    }
}

#[async_trait]
impl AuthBackend for InMemoryHomeserver {
    async fn request_email_token(
        &self,
        address: &EmailAddress,
        _client_secret: &str,
        _send_attempt: u32,
    ) -> AccountResult<String> {
        let mut tables = self.tables.write().unwrap();
        let sid = format!("sid-{}", tables.next_id());
        tables
            .email_sessions
            .insert(sid.clone(), address.as_str().to_string());
        Ok(sid)
    }

    async fn register_with_three_pid(
        &self,
        credentials: &ThreePidCredentials,
        _password: &str,
        _device_display_name: &str,
    ) -> AccountResult<UserId> {
        let tables = self.tables.read().unwrap();
        let email = tables
            .email_sessions
            .get(&credentials.sid)
            .ok_or_else(|| {
                AccountError::RegistrationFailed("unknown verification session".to_string())
            })?;

        let localpart = email.split('@').next().unwrap_or("user").replace('.', "-");
        Ok(UserId::new(format!("@{}:{}", localpart, self.host)))
    }
}
