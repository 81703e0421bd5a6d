use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::utils::Result;

/// What a queued operation asks the backend to do with a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicAction {
    Subscribe,
    Unsubscribe,
}

impl std::fmt::Display for TopicAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopicAction::Subscribe => f.write_str("subscribe"),
            TopicAction::Unsubscribe => f.write_str("unsubscribe"),
        }
    }
}

/// Receives the outcome of a deferred operation. Dropping the matching
/// receiver is allowed; the outcome is then discarded.
pub type Completion = oneshot::Sender<Result<()>>;

/// One pending intent.
///
/// Only `topic` and `action` are persisted. Operations restored from disk
/// never carry a completion.
#[derive(Debug)]
pub struct TopicOperation {
    pub topic: String,
    pub action: TopicAction,
    pub completion: Option<Completion>,
}

impl TopicOperation {
    pub fn new(topic: impl Into<String>, action: TopicAction, completion: Option<Completion>) -> Self {
        Self {
            topic: topic.into(),
            action,
            completion,
        }
    }
}
