//! The `queue` module holds deferred subscribe/unsubscribe intents until a
//! credential exists, then replays them one at a time against the backend.
//!
//! The queue never talks to the network itself. It is driven through the
//! [`QueueDriver`] trait, which the coordinator implements, and only ever
//! holds a weak reference to that driver.

pub mod operation;
pub mod pending;
pub mod snapshot;

pub use operation::{Completion, TopicAction, TopicOperation};
pub use pending::{PendingTopicQueue, QueueDriver};
pub use snapshot::{PersistedOperation, QueueSnapshot, SNAPSHOT_VERSION};
