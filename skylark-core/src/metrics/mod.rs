//! Metrics collection for observability
//!
//! Uses the `metrics` facade; exporters are the embedding application's
//! choice. Call [`init_metrics`] once at startup to register descriptions.

use metrics::{counter, describe_counter};

/// Register metric descriptions
pub fn init_metrics() {
    // Invite flow
    describe_counter!("invite.attempts", "Email invitation attempts started");
    describe_counter!("invite.sent", "Invitations that created a new discussion");
    describe_counter!(
        "invite.already_sent",
        "Attempts resolved against an existing pending invite"
    );
    describe_counter!("invite.revocations", "Stale third-party invites revoked");

    // Directory
    describe_counter!("directory.lookups", "Third-party identifier lookups issued");

    // Public room directory
    describe_counter!("public_rooms.requests", "Per-server public room queries issued");
    describe_counter!("public_rooms.failures", "Per-server public room queries failed");
}

/// Record a counter metric
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}
