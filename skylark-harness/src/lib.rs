//! Skylark test harness
//!
//! An in-memory homeserver standing in for every backend seam of
//! `skylark-core`, so the full client flows can be driven end to end
//! without a network.

pub mod homeserver;

pub use homeserver::InMemoryHomeserver;
