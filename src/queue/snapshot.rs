//! On-disk form of the pending queue.
//!
//! A snapshot is a JSON document holding the queued `(topic, action)` pairs
//! in processing order:
//!
//! ```json
//! {"version":1,"operations":[{"topic":"/topics/news","action":"subscribe"}]}
//! ```

use serde::{Deserialize, Serialize};

use super::operation::TopicAction;
use crate::utils::Result;

/// Format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A queued operation stripped of its completion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PersistedOperation {
    pub topic: String,
    pub action: TopicAction,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub version: u32,
    pub operations: Vec<PersistedOperation>,
}

impl QueueSnapshot {
    pub fn new(operations: Vec<PersistedOperation>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            operations,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a snapshot, rejecting versions newer than this build knows.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let snapshot: QueueSnapshot = serde_json::from_slice(bytes)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                "unsupported snapshot version {}",
                snapshot.version
            ))
            .into());
        }
        Ok(snapshot)
    }
}

impl Default for QueueSnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
