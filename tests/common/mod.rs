//! Local chat backend for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, post},
};
use serde_json::Value;

/// What the fake backend answers and what it has seen.
#[derive(Debug)]
pub struct ServerState {
    pub chat_calls: AtomicUsize,
    pub clear_calls: AtomicUsize,
    pub messages: Mutex<Vec<Value>>,
    chat_response: Mutex<(StatusCode, String)>,
    clear_status: Mutex<StatusCode>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            chat_calls: AtomicUsize::new(0),
            clear_calls: AtomicUsize::new(0),
            messages: Mutex::new(Vec::new()),
            chat_response: Mutex::new((StatusCode::OK, r#"{"reply":"hi"}"#.to_string())),
            clear_status: Mutex::new(StatusCode::OK),
        }
    }
}

impl ServerState {
    pub fn respond_chat(&self, status: StatusCode, body: &str) {
        *self.chat_response.lock().unwrap() = (status, body.to_string());
    }

    pub fn respond_clear(&self, status: StatusCode) {
        *self.clear_status.lock().unwrap() = status;
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

async fn chat(State(state): State<Arc<ServerState>>, Json(body): Json<Value>) -> impl IntoResponse {
    state.chat_calls.fetch_add(1, Ordering::SeqCst);
    state.messages.lock().unwrap().push(body);
    let (status, body) = state.chat_response.lock().unwrap().clone();
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

async fn clear(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    state.clear_calls.fetch_add(1, Ordering::SeqCst);
    let status = *state.clear_status.lock().unwrap();
    (status, Json(serde_json::json!({ "success": status.is_success() })))
}

/// Serve the fake backend on an ephemeral port and return its base URL.
pub async fn spawn(state: Arc<ServerState>) -> anyhow::Result<String> {
    let app = Router::new()
        .route("/api/ai-chat", post(chat))
        .route("/api/ai-chat/clear", delete(clear))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

/// A base URL nothing is listening on.
pub async fn unreachable_url() -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
