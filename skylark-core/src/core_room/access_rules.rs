//! Room access-rule resolution
//!
//! The access rule governs whether externally-hosted accounts may join a
//! room. It is recorded as a custom state event; rooms created before the
//! policy existed have none, so resolution falls back to a fail-closed
//! default.

use super::state::{ACCESS_RULES_CONTENT_KEY, ACCESS_RULES_EVENT_TYPE};
use super::types::RoomState;

/// A room's access policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRule {
    /// External users are not allowed
    Restricted,
    /// External users are allowed to join
    Unrestricted,
    /// The room is a 1:1 chat
    Direct,
    /// Unrecognized rule value, preserved verbatim
    Other(String),
}

impl AccessRule {
    /// Wire identifier for the rule
    pub fn identifier(&self) -> &str {
        match self {
            AccessRule::Restricted => "restricted",
            AccessRule::Unrestricted => "unrestricted",
            AccessRule::Direct => "direct",
            AccessRule::Other(value) => value,
        }
    }

    /// Parse a rule identifier, keeping unknown values intact so a newer
    /// server's rules are never silently misclassified
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier {
            "restricted" => AccessRule::Restricted,
            "unrestricted" => AccessRule::Unrestricted,
            "direct" => AccessRule::Direct,
            other => AccessRule::Other(other.to_string()),
        }
    }
}

/// Resolve the access rule recorded in `state`.
///
/// Among multiple access-rule events the one with the greatest
/// `origin_server_ts` wins, ties going to the last one seen in scan order.
/// Without any such event, direct rooms default to [`AccessRule::Direct`]
/// and everything else to [`AccessRule::Restricted`].
pub fn resolve_access_rule(state: &RoomState) -> AccessRule {
    let latest = state
        .events
        .iter()
        .filter(|event| event.event_type == ACCESS_RULES_EVENT_TYPE)
        .filter_map(|event| {
            event
                .content
                .get(ACCESS_RULES_CONTENT_KEY)
                .and_then(|value| value.as_str())
                .map(|rule| (event.origin_server_ts, rule))
        })
        // max_by_key keeps the last of equally-maximal elements
        .max_by_key(|(ts, _)| *ts);

    match latest {
        Some((_, rule)) => AccessRule::from_identifier(rule),
        None if state.is_direct => AccessRule::Direct,
        None => AccessRule::Restricted,
    }
}
