//! The `backend` module defines what the coordinator needs from the outside
//! world to perform a subscription change, and ships one implementation of
//! each:
//!
//! - [`BackendClient`]: performs a subscribe/unsubscribe call. Implemented
//!   over WebSockets by [`WebSocketBackend`].
//! - [`CredentialProvider`]: yields the current registration token, if any.
//!   Implemented by [`StaticCredential`].

pub mod credential;
pub mod message;
pub mod websocket;

pub use credential::StaticCredential;
pub use message::{BackendRequest, BackendResponse};
pub use websocket::WebSocketBackend;

use async_trait::async_trait;

use crate::coordinator::SubscriptionOptions;
use crate::utils::Result;

/// Client for the push-messaging backend.
///
/// Timeouts are the implementation's responsibility.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Subscribes `credential` to `topic`, or unsubscribes it when
    /// `should_delete` is set.
    async fn update_subscription(
        &self,
        credential: &str,
        topic: &str,
        options: &SubscriptionOptions,
        should_delete: bool,
    ) -> Result<()>;
}

/// Source of the current registration token.
pub trait CredentialProvider: Send + Sync {
    fn current_credential(&self) -> Option<String>;
}

#[cfg(test)]
mod tests;
