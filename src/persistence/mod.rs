//! The `persistence` module stores the pending-topics snapshot so deferred
//! operations survive a restart.
//!
//! The coordinator only needs whole-value `save`/`load` by key, expressed by
//! [`KeyValueStore`]. `sled` backs the durable implementation; an in-memory
//! map covers tests and ephemeral use.

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use crate::utils::Result;

/// Key under which the pending-topics snapshot is stored.
pub const PENDING_TOPICS_KEY: &str = "topicsync.pending_topics";

/// Durable key-value storage used to persist queue snapshots.
pub trait KeyValueStore: Send + Sync {
    /// Replaces the value stored under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Returns the value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;
}
