use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tungstenite::protocol::Message as WsMessage;

use super::{
    BackendClient, BackendRequest, BackendResponse, CredentialProvider, StaticCredential,
    WebSocketBackend,
};
use crate::coordinator::SubscriptionOptions;
use crate::utils::Error;

/// Starts a backend that rejects topics containing "forbidden" and accepts
/// everything else. Each reply is preceded by a response for an unrelated
/// request, which the client must skip.
async fn spawn_backend() -> (String, mpsc::UnboundedReceiver<BackendRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut ws = accept_async(stream).await.unwrap();
                while let Some(Ok(msg)) = ws.next().await {
                    if !msg.is_text() {
                        continue;
                    }
                    let request: BackendRequest =
                        serde_json::from_str(msg.to_text().unwrap()).unwrap();
                    let request_id = request.request_id().to_string();
                    let rejected = matches!(
                        &request,
                        BackendRequest::Subscribe { topic, .. } if topic.contains("forbidden")
                    );

                    let stray = BackendResponse::Ok {
                        request_id: "unrelated".to_string(),
                    };
                    let response = if rejected {
                        BackendResponse::Error {
                            request_id,
                            message: "topic not allowed".to_string(),
                        }
                    } else {
                        BackendResponse::Ok { request_id }
                    };
                    for frame in [stray, response] {
                        let text = serde_json::to_string(&frame).unwrap();
                        ws.send(WsMessage::text(text)).await.unwrap();
                    }
                    let _ = tx.send(request);
                }
            });
        }
    });

    (format!("ws://{addr}"), rx)
}

#[tokio::test]
async fn test_websocket_backend_subscribe_and_unsubscribe() {
    let (url, mut requests) = spawn_backend().await;
    let backend = WebSocketBackend::new(url, Duration::from_secs(2));

    let mut options = SubscriptionOptions::new();
    options.insert("locale", "en");

    backend
        .update_subscription("token-1", "/topics/news", &options, false)
        .await
        .unwrap();
    backend
        .update_subscription("token-1", "/topics/news", &SubscriptionOptions::new(), true)
        .await
        .unwrap();

    match requests.recv().await.unwrap() {
        BackendRequest::Subscribe {
            token,
            topic,
            options,
            ..
        } => {
            assert_eq!(token, "token-1");
            assert_eq!(topic, "/topics/news");
            assert_eq!(options.get("locale"), Some("en"));
        }
        other => panic!("expected subscribe, got {other:?}"),
    }
    assert!(matches!(
        requests.recv().await.unwrap(),
        BackendRequest::Unsubscribe { .. }
    ));
}

#[tokio::test]
async fn test_websocket_backend_reports_rejection() {
    let (url, _requests) = spawn_backend().await;
    let backend = WebSocketBackend::new(url, Duration::from_secs(2));

    let result = backend
        .update_subscription("token-1", "/topics/forbidden", &SubscriptionOptions::new(), false)
        .await;

    assert!(matches!(result, Err(Error::Backend(msg)) if msg == "topic not allowed"));
}

#[tokio::test]
async fn test_websocket_backend_times_out() {
    // accepts TCP through the backlog but never answers the handshake
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let backend = WebSocketBackend::new(url, Duration::from_millis(200));

    let result = backend
        .update_subscription("token-1", "/topics/news", &SubscriptionOptions::new(), false)
        .await;

    assert!(matches!(result, Err(Error::Backend(_))));
    drop(listener);
}

#[test]
fn test_request_wire_format() {
    let mut options = SubscriptionOptions::new();
    options.insert("locale", "en");
    let request = BackendRequest::Unsubscribe {
        request_id: "r1".to_string(),
        token: "t".to_string(),
        topic: "/topics/a".to_string(),
        options,
    };

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "type": "unsubscribe",
            "request_id": "r1",
            "token": "t",
            "topic": "/topics/a",
            "options": { "locale": "en" }
        })
    );
}

#[test]
fn test_static_credential_set_and_clear() {
    let credential = StaticCredential::new(Some(String::new()));
    assert!(credential.current_credential().is_none());

    credential.set("token-1");
    assert_eq!(credential.current_credential().as_deref(), Some("token-1"));

    credential.set("");
    assert!(credential.current_credential().is_none());

    credential.set("token-2");
    credential.clear();
    assert!(credential.current_credential().is_none());
}
