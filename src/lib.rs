//! # topicsync
//!
//! `topicsync` manages subscriptions to named broadcast topics on a
//! push-messaging backend. Requests can be made before a registration token
//! exists: they are queued, persisted, and replayed in order once a token is
//! available.
//!
//! ## Core Modules
//!
//! - `topic`: normalizes and validates `/topics/<name>` identifiers.
//! - `queue`: the durable, coalescing queue of pending subscribe/unsubscribe
//!   intents, executed one at a time.
//! - `coordinator`: the public operation surface; drives and persists the queue.
//! - `backend`: backend client and credential provider interfaces, with a
//!   WebSocket client and a settable token holder.
//! - `persistence`: key-value stores for queue snapshots (`sled` and in-memory).
//! - `config`: loads settings from file and environment.
//! - `utils`: error type and logging setup.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod persistence;
pub mod queue;
pub mod topic;
pub mod utils;

pub use coordinator::{PubSubCoordinator, SubscriptionOptions};
pub use utils::{Error, Result};
