//! Directory trait seams
//!
//! Abstractions over the identity server and the homeserver policy API.
//! Implementations wrap the real SDK; tests substitute recording mocks.

use async_trait::async_trait;

use super::errors::DirectoryResult;
use super::types::{DiscussionLookupResult, EmailAddress, Medium, ResolutionResult};

/// Resolves third-party identifiers against an identity server
#[async_trait]
pub trait ThirdPartyIdResolver: Send + Sync {
    /// Look up whether `address` is already bound to an account.
    ///
    /// Single-attempt contract: implementations must not retry on failure —
    /// the invite flow treats a failed lookup as terminal.
    async fn lookup(
        &self,
        address: &EmailAddress,
        medium: Medium,
        id_server_host: &str,
    ) -> DirectoryResult<ResolutionResult>;
}

/// Finds an existing direct discussion for a third-party address
#[async_trait]
pub trait DiscussionFinder: Send + Sync {
    /// Return the joined direct discussion for `address`, if any.
    async fn find_discussion(
        &self,
        address: &EmailAddress,
    ) -> DirectoryResult<DiscussionLookupResult>;
}

/// Homeserver policy checks for invitee addresses
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether the address's domain is allowed to receive invites
    async fn is_email_authorized(&self, address: &EmailAddress) -> DirectoryResult<bool>;

    /// Whether the address is served by the external (federated) host,
    /// where pending invites may expire
    async fn is_email_bound_to_external_host(
        &self,
        address: &EmailAddress,
    ) -> DirectoryResult<bool>;
}
