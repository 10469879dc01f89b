//! Requires a native target: the fake backend runs on tokio and axum.
#![cfg(not(target_arch = "wasm32"))]

mod common;

use std::sync::Arc;

use ai_chat_widget::backend::{ChatBackend, HttpChatBackend};
use ai_chat_widget::config::WidgetConfig;
use ai_chat_widget::error::WidgetError;
use axum::http::StatusCode;
use common::ServerState;

async fn backend(state: &Arc<ServerState>) -> anyhow::Result<HttpChatBackend> {
    let base_url = common::spawn(Arc::clone(state)).await?;
    Ok(HttpChatBackend::new(base_url, &WidgetConfig::default().endpoints)?)
}

#[tokio::test]
async fn test_send_posts_message_json() -> anyhow::Result<()> {
    let state = Arc::new(ServerState::default());
    let backend = backend(&state).await?;

    let reply = backend.send("Apa itu closure?").await?;

    assert_eq!(reply.text(), Some("hi"));
    assert_eq!(state.chat_calls(), 1);
    assert_eq!(
        state.messages.lock().unwrap()[0],
        serde_json::json!({ "message": "Apa itu closure?" })
    );
    Ok(())
}

#[tokio::test]
async fn test_send_error_body_is_api_error() -> anyhow::Result<()> {
    let state = Arc::new(ServerState::default());
    state.respond_chat(StatusCode::BAD_REQUEST, r#"{"error":"bad"}"#);
    let backend = backend(&state).await?;

    let err = backend.send("x").await.unwrap_err();
    match err {
        WidgetError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message.as_deref(), Some("bad"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_send_numeric_error_code() -> anyhow::Result<()> {
    let state = Arc::new(ServerState::default());
    state.respond_chat(StatusCode::TOO_MANY_REQUESTS, r#"{"error":429}"#);
    let backend = backend(&state).await?;

    let err = backend.send("x").await.unwrap_err();
    assert!(matches!(
        err,
        WidgetError::Api { status: 429, message: Some(ref m) } if m == "429"
    ));
    Ok(())
}

#[tokio::test]
async fn test_send_unparsable_error_body() -> anyhow::Result<()> {
    let state = Arc::new(ServerState::default());
    state.respond_chat(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
    let backend = backend(&state).await?;

    let err = backend.send("x").await.unwrap_err();
    assert!(matches!(
        err,
        WidgetError::Api {
            status: 500,
            message: None
        }
    ));
    Ok(())
}

#[tokio::test]
async fn test_send_unparsable_success_body_is_transport_error() -> anyhow::Result<()> {
    let state = Arc::new(ServerState::default());
    state.respond_chat(StatusCode::OK, "not json");
    let backend = backend(&state).await?;

    let err = backend.send("x").await.unwrap_err();
    assert!(!err.is_application());
    Ok(())
}

#[tokio::test]
async fn test_clear_status_mapping() -> anyhow::Result<()> {
    let state = Arc::new(ServerState::default());
    let backend = backend(&state).await?;

    backend.clear().await?;

    state.respond_clear(StatusCode::INTERNAL_SERVER_ERROR);
    let err = backend.clear().await.unwrap_err();
    assert!(err.is_application());
    assert_eq!(state.clear_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() -> anyhow::Result<()> {
    let base_url = common::unreachable_url().await?;
    let backend = HttpChatBackend::new(base_url, &WidgetConfig::default().endpoints)?;

    let err = backend.send("x").await.unwrap_err();
    assert!(matches!(err, WidgetError::Http(_)));
    Ok(())
}
