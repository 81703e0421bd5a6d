use serde::{Deserialize, Serialize};

use crate::coordinator::SubscriptionOptions;

/// Request sent to the backend. `request_id` is echoed in the response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum BackendRequest {
    #[serde(rename = "subscribe")]
    Subscribe {
        request_id: String,
        token: String,
        topic: String,
        #[serde(default)]
        options: SubscriptionOptions,
    },
    #[serde(rename = "unsubscribe")]
    Unsubscribe {
        request_id: String,
        token: String,
        topic: String,
        #[serde(default)]
        options: SubscriptionOptions,
    },
}

impl BackendRequest {
    pub fn request_id(&self) -> &str {
        match self {
            BackendRequest::Subscribe { request_id, .. }
            | BackendRequest::Unsubscribe { request_id, .. } => request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum BackendResponse {
    #[serde(rename = "ok")]
    Ok { request_id: String },
    #[serde(rename = "error")]
    Error { request_id: String, message: String },
}

impl BackendResponse {
    pub fn request_id(&self) -> &str {
        match self {
            BackendResponse::Ok { request_id } | BackendResponse::Error { request_id, .. } => {
                request_id
            }
        }
    }
}
