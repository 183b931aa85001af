//! In-process relay for end-to-end tests
//!
//! Forwards frames between connected handles the way the production relay
//! does: messages and typing go to the recipient, presence changes go to
//! everyone else, `ping` is answered with `pong`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What the relay wants done with one client socket
#[derive(Debug)]
enum Outgoing {
    Frame(String),
    Close,
}

#[derive(Default)]
struct RelayState {
    connections: Mutex<HashMap<String, mpsc::UnboundedSender<Outgoing>>>,
    /// Every frame received from clients, in arrival order
    received: Mutex<Vec<(String, Value)>>,
}

impl RelayState {
    fn send_to(&self, handle: &str, frame: &Value) -> bool {
        self.connections
            .lock()
            .get(handle)
            .is_some_and(|tx| tx.send(Outgoing::Frame(frame.to_string())).is_ok())
    }

    fn broadcast_except(&self, handle: &str, frame: &Value) {
        let text = frame.to_string();
        for (other, tx) in self.connections.lock().iter() {
            if other != handle {
                let _ = tx.send(Outgoing::Frame(text.clone()));
            }
        }
    }
}

/// Relay server bound to an ephemeral port
pub struct TestRelay {
    pub addr: SocketAddr,
    state: Arc<RelayState>,
    _handle: JoinHandle<()>,
}

impl TestRelay {
    /// Start the relay
    pub async fn start() -> Result<Self> {
        let state = Arc::new(RelayState::default());

        let app = Router::new()
            .route("/ws/:anonymous_id", get(ws_handler))
            .route("/api/online", get(online_handler))
            .route("/api/auth/telegram", post(auth_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// Relay base URL for realtime connections
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// REST base URL
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Handles with an open connection
    pub fn online(&self) -> Vec<String> {
        let mut online: Vec<String> = self.state.connections.lock().keys().cloned().collect();
        online.sort();
        online
    }

    /// Close a client's connection from the relay side
    pub fn kick(&self, handle: &str) -> bool {
        self.state
            .connections
            .lock()
            .get(handle)
            .is_some_and(|tx| tx.send(Outgoing::Close).is_ok())
    }

    /// Deliver a raw frame to a client
    pub fn push(&self, handle: &str, frame: &Value) -> bool {
        self.state.send_to(handle, frame)
    }

    /// Frames of a given type received from `handle`
    pub fn received_from(&self, handle: &str, kind: &str) -> Vec<Value> {
        self.state
            .received
            .lock()
            .iter()
            .filter(|(from, frame)| from == handle && frame["type"] == kind)
            .map(|(_, frame)| frame.clone())
            .collect()
    }
}

async fn ws_handler(
    State(state): State<Arc<RelayState>>,
    Path(anonymous_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, anonymous_id, socket))
}

async fn handle_socket(state: Arc<RelayState>, handle: String, socket: WebSocket) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.connections.lock().insert(handle.clone(), tx);
    state.broadcast_except(&handle, &json!({"type": "status", "user_id": handle, "status": "online"}));

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            outgoing = rx.recv() => match outgoing {
                Some(Outgoing::Frame(text)) => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Some(Outgoing::Close) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => handle_frame(&state, &handle, &text),
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    state.connections.lock().remove(&handle);
    state.broadcast_except(&handle, &json!({"type": "status", "user_id": handle, "status": "offline"}));
}

fn handle_frame(state: &RelayState, sender: &str, text: &str) {
    let Ok(frame) = serde_json::from_str::<Value>(text) else {
        return;
    };
    state.received.lock().push((sender.to_string(), frame.clone()));

    let recipient = frame["recipient_id"].as_str().unwrap_or_default();
    match frame["type"].as_str() {
        Some("ping") => {
            state.send_to(sender, &json!({"type": "pong"}));
        }
        Some("message") => {
            let text = frame["text"].as_str().unwrap_or_default().trim();
            if text.is_empty() {
                return;
            }
            let timestamp = Utc::now().to_rfc3339();
            let delivered = state.send_to(
                recipient,
                &json!({"type": "message", "sender_id": sender, "text": text, "timestamp": timestamp}),
            );
            state.send_to(
                sender,
                &json!({"type": "message_sent", "recipient_id": recipient, "delivered": delivered, "timestamp": timestamp}),
            );
        }
        Some("typing") => {
            let is_typing = frame["is_typing"].as_bool().unwrap_or(true);
            state.send_to(
                recipient,
                &json!({"type": "typing", "sender_id": sender, "is_typing": is_typing}),
            );
        }
        _ => {}
    }
}

async fn online_handler(State(state): State<Arc<RelayState>>) -> Json<Value> {
    let online: Vec<String> = state.connections.lock().keys().cloned().collect();
    Json(json!({ "online": online }))
}

#[derive(Debug, Deserialize)]
struct AuthBody {
    telegram_id: Option<String>,
}

async fn auth_handler(Json(body): Json<AuthBody>) -> impl IntoResponse {
    let Some(telegram_id) = body.telegram_id else {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            Json(json!({"detail": "telegram_id or init_data is required"})),
        );
    };

    // Stable 7-digit handle per external id
    let digits: u64 = telegram_id.bytes().map(u64::from).sum();
    let anonymous_id = 1_000_000 + digits % 9_000_000;

    (
        axum::http::StatusCode::OK,
        Json(json!({
            "id": format!("user-{telegram_id}"),
            "telegram_id": telegram_id,
            "anonymous_id": anonymous_id.to_string(),
            "name": "Ghost",
            "status": null,
            "gender": null,
            "avatar_url": null,
            "notifications_enabled": true,
            "created_at": Utc::now().to_rfc3339(),
        })),
    )
}
