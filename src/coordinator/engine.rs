//! Coordinator engine
//!
//! `PubSubCoordinator` ties together topic validation, the backend client,
//! the credential provider and the pending queue:
//! - `subscribe_now`/`unsubscribe_now` perform a single backend call and
//!   return its result
//! - `subscribe_deferred`/`unsubscribe_deferred` queue the intent and return
//!   a receiver for its eventual outcome; the receiver may be dropped
//! - `trigger_sync` should be called whenever a new credential becomes
//!   available, and once after startup to replay restored operations
//!
//! The coordinator is the queue's driver. The queue holds it only weakly, so
//! dropping the last `Arc<PubSubCoordinator>` stops further dispatch.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use super::options::SubscriptionOptions;
use crate::backend::{BackendClient, CredentialProvider};
use crate::persistence::{KeyValueStore, PENDING_TOPICS_KEY};
use crate::queue::{PendingTopicQueue, PersistedOperation, QueueDriver, QueueSnapshot, TopicAction};
use crate::topic;
use crate::utils::{Error, Result};

pub struct PubSubCoordinator {
    backend: Option<Arc<dyn BackendClient>>,
    credentials: Arc<dyn CredentialProvider>,
    store: Arc<dyn KeyValueStore>,
    queue: Arc<PendingTopicQueue>,
}

impl PubSubCoordinator {
    /// Creates a coordinator that runs queued operations on the current
    /// Tokio runtime, restoring any pending operations saved in `store`.
    /// Unreadable saved state is discarded.
    ///
    /// Fails with [`Error::NoRuntime`] outside a runtime; use
    /// [`PubSubCoordinator::with_runtime`] there. Without a backend client
    /// every operation fails with [`Error::NotConfigured`].
    pub fn new(
        backend: Option<Arc<dyn BackendClient>>,
        credentials: Arc<dyn CredentialProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Arc<Self>> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(Self::with_runtime(runtime, backend, credentials, store))
    }

    /// Like [`PubSubCoordinator::new`], running queued operations on
    /// `runtime`. All methods may then be called from any thread.
    pub fn with_runtime(
        runtime: Handle,
        backend: Option<Arc<dyn BackendClient>>,
        credentials: Arc<dyn CredentialProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Arc<Self> {
        let restored = restore_operations(store.as_ref());

        Arc::new_cyclic(|me: &Weak<Self>| {
            let driver: Weak<dyn QueueDriver> = me.clone();
            Self {
                backend,
                credentials,
                store,
                queue: PendingTopicQueue::restore(restored, driver, runtime),
            }
        })
    }

    pub async fn subscribe_now(
        &self,
        credential: &str,
        topic: &str,
        options: &Map<String, Value>,
    ) -> Result<()> {
        self.update_now(credential, topic, options, false).await
    }

    pub async fn unsubscribe_now(
        &self,
        credential: &str,
        topic: &str,
        options: &Map<String, Value>,
    ) -> Result<()> {
        self.update_now(credential, topic, options, true).await
    }

    /// Queues a subscribe for `topic`.
    pub fn subscribe_deferred(&self, topic: &str) -> Result<oneshot::Receiver<Result<()>>> {
        self.enqueue(topic, TopicAction::Subscribe)
    }

    /// Queues an unsubscribe for `topic`.
    pub fn unsubscribe_deferred(&self, topic: &str) -> Result<oneshot::Receiver<Result<()>>> {
        self.enqueue(topic, TopicAction::Unsubscribe)
    }

    /// Resumes the queue if a credential is available.
    ///
    /// `immediate` is accepted for symmetry with the credential refresh
    /// path; it never bypasses the one-operation-at-a-time rule.
    pub fn trigger_sync(&self, immediate: bool) {
        if self.current_credential().is_some() {
            debug!(immediate, "Credential available, resuming pending topics");
            self.queue.resume_if_needed();
        } else {
            debug!(immediate, "No credential, pending topics stay queued");
        }
    }

    /// Pending operations in processing order, including one in flight.
    pub fn pending_operations(&self) -> Vec<PersistedOperation> {
        self.queue.snapshot().operations
    }

    /// Resolves once every pending operation has been attempted.
    pub async fn wait_until_drained(&self) {
        self.queue.wait_until_drained().await
    }

    async fn update_now(
        &self,
        credential: &str,
        topic: &str,
        options: &Map<String, Value>,
        should_delete: bool,
    ) -> Result<()> {
        if credential.is_empty() {
            return Err(Error::InvalidRequest("credential must not be empty"));
        }
        if topic.is_empty() {
            return Err(Error::InvalidRequest("topic must not be empty"));
        }
        let Some(backend) = &self.backend else {
            return Err(Error::NotConfigured);
        };

        let topic = topic::normalize(topic);
        if !topic::is_valid(&topic) {
            return Err(Error::InvalidTopic(topic));
        }

        let options = SubscriptionOptions::from_json(options);
        backend
            .update_subscription(credential, &topic, &options, should_delete)
            .await
    }

    fn enqueue(&self, topic: &str, action: TopicAction) -> Result<oneshot::Receiver<Result<()>>> {
        let topic = topic::normalize(topic);
        if !topic::is_valid(&topic) {
            return Err(Error::InvalidTopic(topic));
        }

        let (tx, rx) = oneshot::channel();
        self.queue.enqueue(topic, action, Some(tx));
        Ok(rx)
    }

    fn current_credential(&self) -> Option<String> {
        self.credentials
            .current_credential()
            .filter(|credential| !credential.is_empty())
    }
}

#[async_trait]
impl QueueDriver for PubSubCoordinator {
    fn can_proceed(&self) -> bool {
        self.current_credential().is_some()
    }

    async fn execute(&self, topic: &str, action: TopicAction) -> Result<()> {
        let credential = self.current_credential().ok_or(Error::MissingCredential)?;
        let no_options = Map::new();
        match action {
            TopicAction::Subscribe => self.subscribe_now(&credential, topic, &no_options).await,
            TopicAction::Unsubscribe => self.unsubscribe_now(&credential, topic, &no_options).await,
        }
    }

    fn on_queue_changed(&self, snapshot: &QueueSnapshot) {
        let saved = snapshot
            .encode()
            .and_then(|bytes| self.store.save(PENDING_TOPICS_KEY, &bytes));
        if let Err(e) = saved {
            error!("Failed to persist pending topics: {e}");
        }
    }
}

impl std::fmt::Debug for PubSubCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSubCoordinator")
            .field("configured", &self.backend.is_some())
            .field("queue", &self.queue)
            .finish()
    }
}

/// Reads the saved snapshot, falling back to an empty queue on any error.
/// Repeated topics are collapsed by the queue itself.
fn restore_operations(store: &dyn KeyValueStore) -> Vec<PersistedOperation> {
    let loaded = store
        .load(PENDING_TOPICS_KEY)
        .and_then(|bytes| bytes.map(|b| QueueSnapshot::decode(&b)).transpose());

    match loaded {
        Ok(Some(snapshot)) => snapshot
            .operations
            .into_iter()
            .filter(|op| {
                let valid = topic::is_valid(&op.topic);
                if !valid {
                    warn!("Discarding saved operation with invalid topic '{}'", op.topic);
                }
                valid
            })
            .collect(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Ignoring unreadable pending topics snapshot: {e}");
            Vec::new()
        }
    }
}
