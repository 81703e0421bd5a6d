//! WebSocket backend client
//!
//! Each subscription change opens a connection to the configured backend,
//! sends one JSON `BackendRequest` and waits for the `BackendResponse`
//! carrying the same `request_id`. Frames that are not text, or responses
//! for other requests, are skipped. The whole exchange is bounded by the
//! configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tracing::{debug, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use super::BackendClient;
use super::message::{BackendRequest, BackendResponse};
use crate::config::BackendSettings;
use crate::coordinator::SubscriptionOptions;
use crate::utils::{Error, Result};

#[derive(Debug, Clone)]
pub struct WebSocketBackend {
    url: String,
    timeout: Duration,
}

impl WebSocketBackend {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &BackendSettings) -> Self {
        Self::new(
            settings.url.clone(),
            Duration::from_millis(settings.timeout_ms),
        )
    }

    async fn round_trip(&self, request: &BackendRequest) -> Result<()> {
        let (mut ws_stream, _response) = connect_async(self.url.as_str()).await?;

        let text = serde_json::to_string(request)?;
        ws_stream.send(WsMessage::text(text)).await?;

        while let Some(msg) = ws_stream.next().await {
            let msg = msg?;
            if !msg.is_text() {
                continue;
            }

            let response = match serde_json::from_str::<BackendResponse>(msg.to_text()?) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Ignoring unparsable backend frame: {e}");
                    continue;
                }
            };
            if response.request_id() != request.request_id() {
                debug!("Skipping response for request {}", response.request_id());
                continue;
            }

            let _ = ws_stream.close(None).await;
            return match response {
                BackendResponse::Ok { .. } => Ok(()),
                BackendResponse::Error { message, .. } => Err(Error::Backend(message)),
            };
        }

        Err(Error::Backend(
            "connection closed before a response arrived".to_string(),
        ))
    }
}

#[async_trait]
impl BackendClient for WebSocketBackend {
    async fn update_subscription(
        &self,
        credential: &str,
        topic: &str,
        options: &SubscriptionOptions,
        should_delete: bool,
    ) -> Result<()> {
        let request_id = Uuid::new_v4().to_string();
        let request = if should_delete {
            BackendRequest::Unsubscribe {
                request_id,
                token: credential.to_string(),
                topic: topic.to_string(),
                options: options.clone(),
            }
        } else {
            BackendRequest::Subscribe {
                request_id,
                token: credential.to_string(),
                topic: topic.to_string(),
                options: options.clone(),
            }
        };

        match tokio::time::timeout(self.timeout, self.round_trip(&request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Backend(format!(
                "no response from {} within {:?}",
                self.url, self.timeout
            ))),
        }
    }
}
