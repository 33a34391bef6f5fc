//! State-event construction
//!
//! Builders for the state events the client seeds rooms with at creation
//! time. Builders stamp `origin_server_ts` with zero: the server assigns the
//! real timestamp when the event lands.

use serde_json::json;

use super::access_rules::AccessRule;
use super::types::StateEvent;

/// Event type carrying a room's access rule
pub const ACCESS_RULES_EVENT_TYPE: &str = "io.skylark.room.access_rules";

/// Content key holding the rule identifier
pub const ACCESS_RULES_CONTENT_KEY: &str = "rule";

/// Event type carrying a room's history visibility
pub const HISTORY_VISIBILITY_EVENT_TYPE: &str = "room.history_visibility";

/// Content key holding the visibility identifier
pub const HISTORY_VISIBILITY_CONTENT_KEY: &str = "history_visibility";

/// Event type of a third-party invite in room state
///
/// Sending an event of this type with empty content and the invite's token
/// as state key revokes the invite.
pub const THIRD_PARTY_INVITE_EVENT_TYPE: &str = "room.third_party_invite";

/// Who may read a room's history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryVisibility {
    /// Anybody, member or not
    WorldReadable,
    /// Members, from the point they were invited
    Invited,
    /// Members, from the point they joined
    Joined,
    /// Members, for the whole history
    Shared,
}

impl HistoryVisibility {
    /// Wire identifier for the visibility
    pub fn identifier(&self) -> &'static str {
        match self {
            HistoryVisibility::WorldReadable => "world_readable",
            HistoryVisibility::Invited => "invited",
            HistoryVisibility::Joined => "joined",
            HistoryVisibility::Shared => "shared",
        }
    }
}

/// Build the access-rules state event for `rule`
pub fn access_rules_state_event(rule: &AccessRule) -> StateEvent {
    StateEvent {
        event_type: ACCESS_RULES_EVENT_TYPE.to_string(),
        state_key: String::new(),
        content: json!({ ACCESS_RULES_CONTENT_KEY: rule.identifier() }),
        origin_server_ts: 0,
    }
}

/// Build the history-visibility state event for `visibility`
pub fn history_visibility_state_event(visibility: HistoryVisibility) -> StateEvent {
    StateEvent {
        event_type: HISTORY_VISIBILITY_EVENT_TYPE.to_string(),
        state_key: String::new(),
        content: json!({ HISTORY_VISIBILITY_CONTENT_KEY: visibility.identifier() }),
        origin_server_ts: 0,
    }
}
