//! End-to-end invite flow against the in-memory homeserver

use std::sync::Arc;

use skylark_core::config::HomeserverConfig;
use skylark_core::core_directory::{EmailAddress, UserId};
use skylark_core::core_invite::{InviteOutcome, InviteService};
use skylark_core::core_room::access_rules::{resolve_access_rule, AccessRule};
use skylark_harness::InMemoryHomeserver;

fn service_over(homeserver: &Arc<InMemoryHomeserver>) -> InviteService {
    InviteService::new(
        homeserver.clone(),
        homeserver.clone(),
        homeserver.clone(),
        homeserver.clone(),
        HomeserverConfig {
            url: "https://chat.skylark.example".to_string(),
            identity_server_url: Some("https://id.skylark.example".to_string()),
            ..HomeserverConfig::default()
        },
    )
}

fn email(raw: &str) -> EmailAddress {
    EmailAddress::parse(raw).unwrap()
}

#[tokio::test]
async fn bound_address_is_reported_not_invited() {
    let homeserver = Arc::new(InMemoryHomeserver::new("https://chat.skylark.example"));
    let address = email("alice@skylark.example");
    homeserver.bind_email(&address, UserId::new("@alice:chat.skylark.example"));

    let outcome = service_over(&homeserver).send_email_invite(&address).await.unwrap();

    assert_eq!(
        outcome,
        InviteOutcome::IgnoredForDiscoveredUser {
            user_id: UserId::new("@alice:chat.skylark.example")
        }
    );
    assert!(homeserver.created_rooms().is_empty());
}

#[tokio::test]
async fn fresh_invite_creates_direct_discussion_with_direct_rule() {
    let homeserver = Arc::new(InMemoryHomeserver::new("https://chat.skylark.example"));
    let address = email("bob@partner.example");

    let outcome = service_over(&homeserver).send_email_invite(&address).await.unwrap();

    let created = homeserver.created_rooms();
    assert_eq!(created.len(), 1);
    assert_eq!(outcome, InviteOutcome::Sent { room_id: created[0].clone() });

    // The new discussion carries a pending invite and the direct access rule
    let room = homeserver.room(&created[0]).unwrap();
    assert_eq!(room.third_party_invites.len(), 1);
    assert_eq!(room.third_party_invites[0].invite.address, address);
    assert_eq!(resolve_access_rule(&room), AccessRule::Direct);
}

#[tokio::test]
async fn blocked_domain_is_refused_without_side_effects() {
    let homeserver = Arc::new(InMemoryHomeserver::new("https://chat.skylark.example"));
    homeserver.block_domain("blocked.example");

    let outcome = service_over(&homeserver)
        .send_email_invite(&email("eve@blocked.example"))
        .await
        .unwrap();

    assert_eq!(outcome, InviteOutcome::IgnoredForUnauthorizedEmail);
    assert!(homeserver.created_rooms().is_empty());
    assert!(homeserver.left_rooms().is_empty());
}

#[tokio::test]
async fn internal_address_with_pending_invite_is_not_reinvited() {
    let homeserver = Arc::new(InMemoryHomeserver::new("https://chat.skylark.example"));
    let address = email("carol@skylark.example");
    let existing = homeserver.seed_discussion(&address);

    let outcome = service_over(&homeserver).send_email_invite(&address).await.unwrap();

    assert_eq!(outcome, InviteOutcome::AlreadySent { room_id: existing.clone() });
    assert!(homeserver.created_rooms().is_empty());
    assert!(homeserver.left_rooms().is_empty());
    assert!(homeserver.room(&existing).is_some());
}

#[tokio::test]
async fn external_address_gets_stale_invite_replaced() {
    let homeserver = Arc::new(InMemoryHomeserver::new("https://chat.skylark.example"));
    homeserver.mark_domain_external("external.example");
    let address = email("alice@external.example");
    let stale = homeserver.seed_discussion(&address);
    let stale_token = homeserver.room(&stale).unwrap().third_party_invites[0].token.clone();

    let outcome = service_over(&homeserver).send_email_invite(&address).await.unwrap();

    // Old invite revoked, old discussion left, one replacement created
    assert_eq!(homeserver.revoked_tokens(), vec![stale_token]);
    assert_eq!(homeserver.left_rooms(), vec![stale.clone()]);
    assert!(homeserver.room(&stale).is_none());

    let created = homeserver.created_rooms();
    assert_eq!(created.len(), 1);
    assert_ne!(created[0], stale);
    assert_eq!(outcome, InviteOutcome::Sent { room_id: created[0].clone() });
}

#[tokio::test]
async fn failed_revocation_leaves_everything_untouched() {
    let homeserver = Arc::new(InMemoryHomeserver::new("https://chat.skylark.example"));
    homeserver.mark_domain_external("external.example");
    let address = email("alice@external.example");
    let stale = homeserver.seed_discussion(&address);
    homeserver.fail_state_events();

    let outcome = service_over(&homeserver).send_email_invite(&address).await.unwrap();

    assert_eq!(outcome, InviteOutcome::AlreadySent { room_id: stale.clone() });
    assert!(homeserver.left_rooms().is_empty());
    assert!(homeserver.created_rooms().is_empty());
    assert_eq!(homeserver.room(&stale).unwrap().third_party_invites.len(), 1);
}

#[tokio::test]
async fn second_attempt_after_successful_invite_is_idempotent() {
    let homeserver = Arc::new(InMemoryHomeserver::new("https://chat.skylark.example"));
    let address = email("bob@partner.example");
    let service = service_over(&homeserver);

    let first = service.send_email_invite(&address).await.unwrap();
    let InviteOutcome::Sent { room_id } = first else {
        panic!("expected Sent, got {first:?}");
    };

    // The freshly created discussion now exists; a second attempt must not
    // create another one.
    let second = service.send_email_invite(&address).await.unwrap();
    assert_eq!(second, InviteOutcome::AlreadySent { room_id });
    assert_eq!(homeserver.created_rooms().len(), 1);
}
