//! Pending topic queue
//!
//! Holds deferred operations in FIFO order and drains them one at a time:
//! - there is at most one entry per topic; enqueueing a topic that is
//!   already present updates that entry in place, so the latest intent wins
//! - if the entry is executing, the new intent is kept as its follow-up and
//!   the entry is replayed with it, in the same position, once the current
//!   execution finishes
//! - an operation is dispatched only when nothing else is in flight and the
//!   driver reports that a credential exists
//! - an operation leaves the queue when its execution finishes, whether it
//!   succeeded or failed; failures are not retried here
//!
//! Concurrency notes:
//! - all state transitions happen under a single mutex, which is never held
//!   across an `.await`
//! - execution runs on the runtime whose handle the queue was built with, so
//!   callers may enqueue from any thread
//! - if that runtime is gone and the execution never runs, the entry is
//!   released back to queued instead of staying in flight
//! - the driver is notified of every change while the lock is held, which
//!   keeps persisted snapshots in the same order as in-memory changes

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use super::operation::{Completion, TopicAction, TopicOperation};
use super::snapshot::{PersistedOperation, QueueSnapshot};
use crate::utils::{Error, Result};

/// Callbacks the queue uses to decide, execute and persist.
///
/// `can_proceed` and `on_queue_changed` are called with the queue lock held
/// and must not call back into the queue.
#[async_trait]
pub trait QueueDriver: Send + Sync {
    /// Whether a credential is available right now.
    fn can_proceed(&self) -> bool;

    /// Performs the backend call for one operation.
    async fn execute(&self, topic: &str, action: TopicAction) -> Result<()>;

    /// Called after every change with the full queue contents.
    fn on_queue_changed(&self, snapshot: &QueueSnapshot);
}

/// Intent recorded for a topic while its entry is executing.
#[derive(Debug)]
struct FollowUp {
    action: TopicAction,
    completion: Option<Completion>,
}

#[derive(Debug)]
struct Entry {
    id: u64,
    operation: TopicOperation,
    follow_up: Option<FollowUp>,
}

impl Entry {
    /// The action this topic should end up with.
    fn desired_action(&self) -> TopicAction {
        self.follow_up
            .as_ref()
            .map_or(self.operation.action, |next| next.action)
    }
}

#[derive(Debug, Default)]
struct QueueState {
    entries: VecDeque<Entry>,
    in_flight: Option<u64>,
    next_id: u64,
}

impl QueueState {
    fn push(&mut self, operation: TopicOperation) {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(Entry {
            id,
            operation,
            follow_up: None,
        });
    }

    fn position(&self, topic: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.operation.topic == topic)
    }

    fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot::new(
            self.entries
                .iter()
                .map(|entry| PersistedOperation {
                    topic: entry.operation.topic.clone(),
                    action: entry.desired_action(),
                })
                .collect(),
        )
    }
}

/// Finishes a dispatched operation. Dropped without finishing (the task
/// never ran or was cancelled), it puts the entry back to queued.
struct Dispatch {
    queue: Option<Arc<PendingTopicQueue>>,
    id: u64,
}

impl Dispatch {
    fn finish(mut self, outcome: Result<()>) {
        if let Some(queue) = self.queue.take() {
            queue.complete(self.id, outcome);
        }
    }
}

impl Drop for Dispatch {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.take() {
            queue.release(self.id);
        }
    }
}

pub struct PendingTopicQueue {
    state: Mutex<QueueState>,
    driver: Weak<dyn QueueDriver>,
    runtime: Handle,
    drained: Notify,
}

impl PendingTopicQueue {
    pub fn new(driver: Weak<dyn QueueDriver>, runtime: Handle) -> Arc<Self> {
        Self::restore(Vec::new(), driver, runtime)
    }

    /// Rebuilds a queue from persisted operations. Repeated topics collapse
    /// into the first position with the last action.
    pub fn restore(
        operations: Vec<PersistedOperation>,
        driver: Weak<dyn QueueDriver>,
        runtime: Handle,
    ) -> Arc<Self> {
        let mut state = QueueState::default();
        for persisted in operations {
            match state.position(&persisted.topic) {
                Some(pos) => state.entries[pos].operation.action = persisted.action,
                None => state.push(TopicOperation::new(persisted.topic, persisted.action, None)),
            }
        }
        if !state.entries.is_empty() {
            info!("Restored {} pending topic operation(s)", state.entries.len());
        }

        Arc::new(Self {
            state: Mutex::new(state),
            driver,
            runtime,
            drained: Notify::new(),
        })
    }

    /// Queues an operation, or updates the entry for the same topic in
    /// place. A replaced intent's completion receives [`Error::Superseded`].
    ///
    /// The topic must already be normalized and validated.
    pub fn enqueue(self: &Arc<Self>, topic: String, action: TopicAction, completion: Option<Completion>) {
        let superseded = {
            let mut state = self.lock();
            let in_flight = state.in_flight;

            let superseded = match state.position(&topic) {
                Some(pos) if Some(state.entries[pos].id) == in_flight => {
                    debug!("Recording {action} {topic} after the running operation");
                    let previous = state.entries[pos].follow_up.replace(FollowUp { action, completion });
                    previous.and_then(|next| next.completion)
                }
                Some(pos) => {
                    let entry = &mut state.entries[pos];
                    debug!(
                        "Coalescing {} {} into queued {}",
                        action, topic, entry.operation.action
                    );
                    entry.operation.action = action;
                    std::mem::replace(&mut entry.operation.completion, completion)
                }
                None => {
                    debug!("Queued {action} {topic}");
                    state.push(TopicOperation::new(topic, action, completion));
                    None
                }
            };

            self.notify_changed(&state);
            superseded
        };

        if let Some(completion) = superseded {
            let _ = completion.send(Err(Error::Superseded));
        }

        self.resume_if_needed();
    }

    /// Dispatches the head operation if nothing is in flight and the driver
    /// can proceed. Otherwise does nothing.
    pub fn resume_if_needed(self: &Arc<Self>) {
        let Some(driver) = self.driver.upgrade() else {
            debug!("Queue driver is gone, not resuming");
            return;
        };

        let (id, topic, action) = {
            let mut state = self.lock();
            if state.in_flight.is_some() {
                return;
            }
            let Some(head) = state.entries.front() else {
                return;
            };
            if !driver.can_proceed() {
                debug!("No credential yet, {} operation(s) waiting", state.entries.len());
                return;
            }

            let next = (head.id, head.operation.topic.clone(), head.operation.action);
            state.in_flight = Some(next.0);
            next
        };

        info!("Dispatching {action} {topic}");
        let dispatch = Dispatch {
            queue: Some(Arc::clone(self)),
            id,
        };
        self.runtime.spawn(async move {
            let outcome = driver.execute(&topic, action).await;
            dispatch.finish(outcome);
        });
    }

    fn complete(self: &Arc<Self>, id: u64, outcome: Result<()>) {
        let (finished, now_empty) = {
            let mut state = self.lock();
            if state.in_flight == Some(id) {
                state.in_flight = None;
            }

            let finished = match state.entries.iter().position(|entry| entry.id == id) {
                Some(pos) => {
                    let entry = &mut state.entries[pos];
                    match entry.follow_up.take() {
                        Some(next) => {
                            let topic = entry.operation.topic.clone();
                            let action = std::mem::replace(&mut entry.operation.action, next.action);
                            let completion =
                                std::mem::replace(&mut entry.operation.completion, next.completion);
                            debug!("Requeued {topic} as {}", next.action);
                            Some(TopicOperation::new(topic, action, completion))
                        }
                        None => state.entries.remove(pos).map(|entry| entry.operation),
                    }
                }
                None => None,
            };

            self.notify_changed(&state);
            (finished, state.entries.is_empty())
        };

        let Some(operation) = finished else {
            warn!("Completed operation {id} was no longer queued");
            return;
        };

        let TopicOperation {
            topic,
            action,
            completion,
        } = operation;
        match &outcome {
            Ok(()) => info!("Completed {action} {topic}"),
            Err(e) => warn!("Failed {action} {topic}: {e}"),
        }

        if let Some(completion) = completion {
            let _ = completion.send(outcome);
        }

        if now_empty {
            self.drained.notify_waiters();
        }

        self.resume_if_needed();
    }

    /// Returns a dispatched entry to queued without running it.
    fn release(&self, id: u64) {
        let mut state = self.lock();
        if state.in_flight == Some(id) {
            warn!("Operation {id} was dropped before it ran, keeping it queued");
            state.in_flight = None;
        }
    }

    /// Resolves once the queue has no operations left.
    ///
    /// Only returns while operations can make progress, so callers should
    /// make sure a credential is available first.
    pub async fn wait_until_drained(&self) {
        loop {
            let notified = self.drained.notified();
            if self.is_empty() {
                return;
            }
            notified.await;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// One entry per topic, in processing order, each with the action the
    /// topic should end up with.
    pub fn snapshot(&self) -> QueueSnapshot {
        self.lock().snapshot()
    }

    /// The operation currently executing, if any.
    pub fn in_flight(&self) -> Option<PersistedOperation> {
        let state = self.lock();
        let id = state.in_flight?;
        state
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| PersistedOperation {
                topic: entry.operation.topic.clone(),
                action: entry.operation.action,
            })
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_changed(&self, state: &QueueState) {
        if let Some(driver) = self.driver.upgrade() {
            driver.on_queue_changed(&state.snapshot());
        }
    }
}

impl std::fmt::Debug for PendingTopicQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("PendingTopicQueue")
            .field("len", &state.entries.len())
            .field("in_flight", &state.in_flight)
            .finish()
    }
}
