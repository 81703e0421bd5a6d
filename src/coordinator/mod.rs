//! The `coordinator` module is the public entry point for subscription
//! changes.
//!
//! Immediate operations validate and go straight to the backend client.
//! Deferred operations are validated, then handed to the pending queue,
//! which the coordinator drives and persists.

pub mod engine;
pub mod options;

pub use engine::PubSubCoordinator;
pub use options::SubscriptionOptions;
