//! Skylark client core
//!
//! Client-side orchestration for a federation-aware workplace messenger.
//! The heavy machinery (HTTP, sync, encryption, persistence) lives behind the
//! async backend traits in [`core_directory`] and [`core_room`]; this crate
//! implements the decision logic on top of them: email invitations, direct
//! discussion resolution, room access-rule policy, public-room aggregation
//! and email-based registration.

pub mod config;
pub mod core_account;
pub mod core_directory;
pub mod core_invite;
pub mod core_room;
pub mod logging;
pub mod metrics;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use core_invite::{InviteOutcome, InviteService};
pub use core_room::access_rules::AccessRule;
pub use logging::{init_logging, LogLevel};
