//! Aggregated public-room directory
//!
//! A deployment federates a fixed set of homeservers; the directory view is
//! the merge of every server's public rooms. One query per server runs
//! concurrently and a failing server contributes an empty chunk instead of
//! failing the whole aggregation.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use super::backend::RoomBackend;
use super::types::PublicRoom;
use crate::metrics::record_counter;

/// Page size requested from each server
const PUBLIC_ROOMS_PAGE_SIZE: u32 = 20;

/// Aggregates public rooms across the deployment's homeservers
pub struct PublicRoomService {
    backend: Arc<dyn RoomBackend>,
    homeservers: Vec<String>,
}

impl PublicRoomService {
    /// Create a service querying `homeservers` through `backend`
    pub fn new(backend: Arc<dyn RoomBackend>, homeservers: Vec<String>) -> Self {
        Self { backend, homeservers }
    }

    /// Fetch and merge public rooms from every configured server.
    ///
    /// The session's own homeserver is queried with `None` so the backend
    /// uses the session default. Per-server failures are logged and replaced
    /// by an empty result.
    pub async fn public_rooms(&self, search: Option<&str>) -> Vec<PublicRoom> {
        let requests = self.homeservers.iter().map(|homeserver| {
            let server = if self.is_current_homeserver(homeserver) {
                None
            } else {
                Some(homeserver.clone())
            };

            async move {
                record_counter("public_rooms.requests", 1);
                match self
                    .backend
                    .public_rooms(server.as_deref(), PUBLIC_ROOMS_PAGE_SIZE, search)
                    .await
                {
                    Ok(rooms) => {
                        debug!(server = %homeserver, count = rooms.len(), "public rooms chunk");
                        rooms
                    }
                    Err(err) => {
                        record_counter("public_rooms.failures", 1);
                        warn!(server = %homeserver, %err, "public rooms lookup failed");
                        Vec::new()
                    }
                }
            }
        });

        join_all(requests).await.into_iter().flatten().collect()
    }

    fn is_current_homeserver(&self, homeserver: &str) -> bool {
        match self.backend.current_homeserver() {
            Some(current) => current.contains(homeserver),
            None => false,
        }
    }
}
