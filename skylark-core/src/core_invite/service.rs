//! Invite orchestration
//!
//! One invitation attempt is a single pass through a linear decision tree:
//!
//! 1. resolve the email against the identity server — a bound address means
//!    the user already has an account and email is the wrong channel;
//! 2. look for an existing direct discussion;
//! 3. with an existing discussion, re-invite only externally-hosted
//!    addresses (their pending invites may expire): revoke the stale invite,
//!    leave the old discussion, recreate;
//! 4. check domain authorization, then create the discussion seeded with a
//!    pending third-party invite.
//!
//! Revocation-path failures are absorbed into [`InviteOutcome::AlreadySent`];
//! there is no reliable signal for whether the prior invite actually expired,
//! so the flow prefers a benign answer over a spurious error.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::errors::{InviteError, InviteResult};
use super::types::InviteOutcome;
use crate::config::HomeserverConfig;
use crate::core_directory::{
    DiscussionFinder, DiscussionLookupResult, EmailAddress, Medium, ResolutionResult,
    ThirdPartyIdResolver, UserDirectory,
};
use crate::core_room::state::{
    access_rules_state_event, history_visibility_state_event, HistoryVisibility,
    THIRD_PARTY_INVITE_EVENT_TYPE,
};
use crate::core_room::{AccessRule, RoomBackend, RoomId, ThirdPartyInvite};
use crate::metrics::record_counter;

/// Orchestrates one email invitation attempt
pub struct InviteService {
    resolver: Arc<dyn ThirdPartyIdResolver>,
    finder: Arc<dyn DiscussionFinder>,
    directory: Arc<dyn UserDirectory>,
    rooms: Arc<dyn RoomBackend>,
    homeserver: HomeserverConfig,

    /// Room currently going through revoke-and-leave, for observability.
    /// Cleared unconditionally when the sequence completes.
    room_in_process: Mutex<Option<RoomId>>,
}

impl InviteService {
    pub fn new(
        resolver: Arc<dyn ThirdPartyIdResolver>,
        finder: Arc<dyn DiscussionFinder>,
        directory: Arc<dyn UserDirectory>,
        rooms: Arc<dyn RoomBackend>,
        homeserver: HomeserverConfig,
    ) -> Self {
        Self {
            resolver,
            finder,
            directory,
            rooms,
            homeserver,
            room_in_process: Mutex::new(None),
        }
    }

    /// Attempt to invite `email`, producing exactly one terminal outcome.
    ///
    /// Directory and room failures from the resolution and creation steps
    /// propagate; failures while replacing a stale external invite degrade
    /// to [`InviteOutcome::AlreadySent`].
    pub async fn send_email_invite(&self, email: &EmailAddress) -> InviteResult<InviteOutcome> {
        record_counter("invite.attempts", 1);

        let id_server_host = self
            .homeserver
            .identity_server_host()
            .ok_or(InviteError::Unknown)?;

        match self.discover_user(email, &id_server_host).await? {
            ResolutionResult::Bound(user_id) => {
                debug!(%email, %user_id, "address already bound, not inviting by email");
                Ok(InviteOutcome::IgnoredForDiscoveredUser { user_id })
            }
            ResolutionResult::Unbound => match self.finder.find_discussion(email).await? {
                DiscussionLookupResult::JoinedDiscussion(room_id) => {
                    self.handle_existing_discussion(email, room_id, &id_server_host)
                        .await
                }
                DiscussionLookupResult::NoDiscussion => {
                    self.create_discussion(email, &id_server_host).await
                }
            },
        }
    }

    /// Single-attempt identity lookup (the resolver contract forbids retries)
    async fn discover_user(
        &self,
        email: &EmailAddress,
        id_server_host: &str,
    ) -> InviteResult<ResolutionResult> {
        record_counter("directory.lookups", 1);
        let result = self
            .resolver
            .lookup(email, Medium::Email, id_server_host)
            .await?;
        Ok(result)
    }

    /// An invite for this address is already pending somewhere.
    ///
    /// Internally-hosted addresses are never re-invited. Externally-hosted
    /// ones are, because their invites expire: revoke, leave, recreate. Any
    /// failure on that path reports the invite as already sent.
    async fn handle_existing_discussion(
        &self,
        email: &EmailAddress,
        room_id: RoomId,
        id_server_host: &str,
    ) -> InviteResult<InviteOutcome> {
        match self.directory.is_email_bound_to_external_host(email).await {
            Ok(true) => match self.revoke_pending_invite_and_leave(&room_id).await {
                Ok(()) => self.create_discussion(email, id_server_host).await,
                Err(err) => {
                    warn!(%room_id, %err, "failed to replace stale external invite");
                    record_counter("invite.already_sent", 1);
                    Ok(InviteOutcome::AlreadySent { room_id })
                }
            },
            Ok(false) => {
                record_counter("invite.already_sent", 1);
                Ok(InviteOutcome::AlreadySent { room_id })
            }
            Err(err) => {
                warn!(%room_id, %err, "external host check failed");
                record_counter("invite.already_sent", 1);
                Ok(InviteOutcome::AlreadySent { room_id })
            }
        }
    }

    /// Authorization gate plus discussion creation
    async fn create_discussion(
        &self,
        email: &EmailAddress,
        id_server_host: &str,
    ) -> InviteResult<InviteOutcome> {
        if !self.directory.is_email_authorized(email).await? {
            info!(domain = email.domain(), "invite refused for unauthorized domain");
            return Ok(InviteOutcome::IgnoredForUnauthorizedEmail);
        }

        let invite = ThirdPartyInvite {
            medium: Medium::Email,
            address: email.clone(),
            id_server_host: id_server_host.to_string(),
        };
        // Discussions are direct rooms whose history opens at the invite
        let initial_state = vec![
            access_rules_state_event(&AccessRule::Direct),
            history_visibility_state_event(HistoryVisibility::Invited),
        ];

        let room_id = self.rooms.create_direct_room(invite, initial_state).await?;
        info!(%room_id, "discussion created, invite sent");
        record_counter("invite.sent", 1);
        Ok(InviteOutcome::Sent { room_id })
    }

    /// Revoke the pending third-party invite recorded in the room's state,
    /// then leave the room. Missing pending invite is not an error: the room
    /// is left regardless so a fresh discussion can take its place.
    async fn revoke_pending_invite_and_leave(&self, room_id: &RoomId) -> InviteResult<()> {
        *self.room_in_process.lock().await = Some(room_id.clone());
        let result = self.revoke_and_leave_inner(room_id).await;
        *self.room_in_process.lock().await = None;
        result
    }

    async fn revoke_and_leave_inner(&self, room_id: &RoomId) -> InviteResult<()> {
        let state = self
            .rooms
            .room_state(room_id)
            .await
            .map_err(|_| InviteError::Unknown)?;

        match state.third_party_invites.first() {
            Some(pending) => {
                record_counter("invite.revocations", 1);
                self.rooms
                    .send_state_event(
                        room_id,
                        THIRD_PARTY_INVITE_EVENT_TYPE,
                        json!({}),
                        &pending.token,
                    )
                    .await?;
            }
            None => {
                debug!(%room_id, "no pending invite to revoke");
            }
        }

        self.rooms.leave_room(room_id).await?;
        Ok(())
    }
}
