//! In-process mock of a chat-completions endpoint for tests.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};

/// Authorization header and JSON body of the last request the mock received.
#[derive(Clone, Default)]
pub(crate) struct CapturedRequest(Arc<Mutex<Option<(Option<String>, Value)>>>);

impl CapturedRequest {
    pub(crate) fn take(&self) -> Option<(Option<String>, Value)> {
        self.0.lock().unwrap().take()
    }

    fn store(&self, auth: Option<String>, body: Value) {
        *self.0.lock().unwrap() = Some((auth, body));
    }
}

/// Body of a successful completion whose first choice says `reply`.
pub(crate) fn completion_body(reply: &str) -> String {
    json!({
        "id": "chatcmpl-mock",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": reply },
                "finish_reason": "stop"
            }
        ]
    })
    .to_string()
}

/// Start a mock that answers with `reply` as the first choice on success
/// statuses, or with `reply` as the raw error body otherwise.
pub(crate) async fn spawn_mock(
    captured: CapturedRequest,
    status: StatusCode,
    reply: &str,
) -> String {
    let body = if status.is_success() {
        completion_body(reply)
    } else {
        reply.to_string()
    };
    spawn_mock_raw(captured, status, body).await
}

/// Start a mock that answers every completion request with `status` and `body`.
/// Returns the base URL to use as a provider's `base_url`.
pub(crate) async fn spawn_mock_raw(
    captured: CapturedRequest,
    status: StatusCode,
    body: String,
) -> String {
    let app = Router::new().route(
        "/chat/completions",
        post(move |headers: HeaderMap, Json(payload): Json<Value>| {
            let captured = captured.clone();
            let body = body.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                captured.store(auth, payload);
                (status, body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL whose port has nothing listening on it.
pub(crate) async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
