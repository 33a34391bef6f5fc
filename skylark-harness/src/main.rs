//! Invite flow demo
//!
//! Drives one email invitation attempt against the in-memory homeserver and
//! prints the outcome, so the decision tree can be explored from the shell:
//!
//!   skylark-harness alice@external.example --external-domain external.example --existing-discussion

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use skylark_core::config::HomeserverConfig;
use skylark_core::core_directory::{EmailAddress, UserId};
use skylark_core::core_invite::{InviteOutcome, InviteService};
use skylark_core::logging::init_logging;
use skylark_core::metrics::init_metrics;
use skylark_harness::InMemoryHomeserver;

#[derive(Parser, Debug)]
#[command(name = "skylark-harness")]
#[command(about = "Drive the Skylark invite flow against an in-memory homeserver", long_about = None)]
struct Args {
    /// Address to invite
    email: String,

    /// Pretend the address is already bound to this account
    #[arg(long)]
    bound_to: Option<String>,

    /// Seed an existing direct discussion holding a pending invite
    #[arg(long)]
    existing_discussion: bool,

    /// Treat this domain as served by the external host
    #[arg(long)]
    external_domain: Vec<String>,

    /// Refuse invites for this domain
    #[arg(long)]
    blocked_domain: Vec<String>,

    /// Make revocation state events fail
    #[arg(long)]
    fail_revocation: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    init_metrics();

    let args = Args::parse();
    let email = EmailAddress::parse(args.email)?;

    let homeserver = Arc::new(InMemoryHomeserver::new("https://chat.skylark.example"));
    if let Some(user_id) = args.bound_to {
        homeserver.bind_email(&email, UserId::new(user_id));
    }
    if args.existing_discussion {
        let room_id = homeserver.seed_discussion(&email);
        println!("seeded discussion {room_id}");
    }
    for domain in &args.external_domain {
        homeserver.mark_domain_external(domain);
    }
    for domain in &args.blocked_domain {
        homeserver.block_domain(domain);
    }
    if args.fail_revocation {
        homeserver.fail_state_events();
    }

    let service = InviteService::new(
        homeserver.clone(),
        homeserver.clone(),
        homeserver.clone(),
        homeserver.clone(),
        HomeserverConfig {
            url: "https://chat.skylark.example".to_string(),
            identity_server_url: None,
            ..HomeserverConfig::default()
        },
    );

    match service.send_email_invite(&email).await? {
        InviteOutcome::Sent { room_id } => {
            println!("invite sent, new discussion {room_id}");
        }
        InviteOutcome::IgnoredForDiscoveredUser { user_id } => {
            println!("address already belongs to {user_id}, invite them directly");
        }
        InviteOutcome::IgnoredForUnauthorizedEmail => {
            println!("domain is not allowed to receive invites");
        }
        InviteOutcome::AlreadySent { room_id } => {
            println!("an invite is already pending in {room_id}");
        }
    }

    let left = homeserver.left_rooms();
    if !left.is_empty() {
        println!("stale discussions left: {}", left.len());
    }

    Ok(())
}
