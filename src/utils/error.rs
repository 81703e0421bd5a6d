//! The `error` module defines the error type shared by every `topicsync`
//! component.
//!
//! Immediate operations return these synchronously; deferred operations
//! deliver them through the completion receiver handed out at enqueue time.

use thiserror::Error;

/// The result type for this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// An error that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// No backend client is attached to the coordinator.
    #[error("no backend client is configured")]
    NotConfigured,

    /// The topic does not match `/topics/[A-Za-z0-9-_.~%]+`.
    #[error("invalid topic name: {0}")]
    InvalidTopic(String),

    /// A required argument was empty.
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    /// A coordinator was created outside a Tokio runtime without a handle.
    #[error("no Tokio runtime available to run queued operations")]
    NoRuntime,

    /// No registration token is available yet.
    #[error("no credential available")]
    MissingCredential,

    /// The backend rejected or failed the call.
    #[error("backend error: {0}")]
    Backend(String),

    /// A later enqueue for the same topic replaced this operation.
    #[error("operation superseded by a newer request for the same topic")]
    Superseded,

    /// Reading or writing the persistent store failed.
    #[error(transparent)]
    Storage(#[from] sled::Error),

    /// Encoding or decoding JSON failed (snapshots and wire messages).
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Loading configuration failed.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl From<tungstenite::Error> for Error {
    fn from(e: tungstenite::Error) -> Self {
        Error::Backend(e.to_string())
    }
}
