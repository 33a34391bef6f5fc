//! Directory value types
//!
//! Short-lived values materialized from one identity-server or directory
//! query and discarded once the caller has branched on them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DirectoryError;
use crate::core_room::RoomId;

/// Unique identifier for a user account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An email address used as a third-party identifier
///
/// Only trivially checked on construction; real validation is the server's
/// job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse an address, requiring a local part and a domain
    pub fn parse(raw: impl Into<String>) -> Result<Self, DirectoryError> {
        let raw = raw.into();
        match raw.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(EmailAddress(raw))
            }
            _ => Err(DirectoryError::InvalidAddress(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The domain part of the address
    pub fn domain(&self) -> &str {
        // Constructor guarantees the separator is present
        self.0.rsplit('@').next().unwrap_or_default()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of third-party identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Medium {
    /// Email address
    Email,
    /// Phone number in MSISDN form
    Msisdn,
}

impl Medium {
    /// Wire identifier for the medium
    pub fn as_str(&self) -> &'static str {
        match self {
            Medium::Email => "email",
            Medium::Msisdn => "msisdn",
        }
    }
}

/// Outcome of a third-party identifier lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// An account already exists for this address
    Bound(UserId),
    /// No account is bound to this address
    Unbound,
}

/// Outcome of a direct-discussion lookup
///
/// The backend collapses its richer internal states (pending invites, left
/// discussions) into these two before they reach the invite orchestrator, so
/// the decision tree stays total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscussionLookupResult {
    /// A direct discussion with this address already exists
    JoinedDiscussion(RoomId),
    /// No direct discussion exists
    NoDiscussion,
}
