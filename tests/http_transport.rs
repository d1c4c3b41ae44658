use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::StatusCode, routing::post, Json, Router};
use portfolio_chat::{Analytics, ChatRole, ChatSession, HttpTransport, SessionState, ERROR_MESSAGE};
use serde_json::Value;
use tokio::net::TcpListener;

async fn stream_reply(Json(body): Json<Value>) -> Body {
    assert_eq!(body["message"], "hello");
    let chunks = ["Hi ", "there", "!"]
        .into_iter()
        .map(|chunk| Ok::<_, std::io::Error>(chunk.to_string()));
    Body::from_stream(futures_util::stream::iter(chunks))
}

async fn server_error() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/chat/stream", post(stream_reply))
        .route("/broken/api/chat/stream", post(server_error));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn session(endpoint: &str) -> ChatSession {
    ChatSession::new(Arc::new(HttpTransport::new(endpoint)), Analytics::disabled())
}

async fn wait_until_idle(session: &ChatSession) -> SessionState {
    let mut rx = session.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|s| !s.is_loading))
        .await
        .expect("reply did not finish in time")
        .unwrap()
        .clone();
    state
}

#[tokio::test]
async fn test_streams_reply_from_backend() {
    let base = spawn_backend().await;
    let session = session(&format!("{}/api/chat/stream", base));

    assert!(session.submit("hello"));
    let state = wait_until_idle(&session).await;

    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[1].role, ChatRole::Assistant);
    assert_eq!(state.messages[1].content, "Hi there!");
}

#[tokio::test]
async fn test_server_error_becomes_apology() {
    let base = spawn_backend().await;
    let session = session(&format!("{}/broken/api/chat/stream", base));

    assert!(session.submit("hello"));
    let state = wait_until_idle(&session).await;

    assert_eq!(state.messages[1].content, ERROR_MESSAGE);
    assert!(!state.is_loading);

    // The session stays usable after a failure
    assert!(session.submit("again"));
    assert_eq!(session.snapshot().messages.len(), 4);
}

#[tokio::test]
async fn test_refused_connection_becomes_apology() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = session(&format!("http://{}/api/chat/stream", addr));
    assert!(session.submit("hello"));
    let state = wait_until_idle(&session).await;

    assert_eq!(state.messages[1].content, ERROR_MESSAGE);
}
