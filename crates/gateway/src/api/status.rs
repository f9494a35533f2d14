//! Status surface: read, patch, and live-subscribe.
//!
//! WebSocket flow:
//! 1. Client connects to `/status/{promptId}/live`.
//! 2. The store delivers the current Status immediately (late-joiner sync).
//! 3. Every subsequent patch pushes the full updated record.
//! 4. Peer disconnect (or a failed send) unsubscribes this socket only.

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::{SinkExt, StreamExt};
use orpheus_domain::status::StatusPatch;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::api_error;
use crate::state::AppState;

/// `GET /status/{promptId}` — the initial record when the id is unknown;
/// reading never fails.
pub async fn get_status(
    State(state): State<AppState>,
    Path(prompt_id): Path<Uuid>,
) -> impl IntoResponse {
    Json(state.status.get(prompt_id))
}

/// `PATCH /status/{promptId}/update` — `203` on success, `400` on a body
/// that is not a valid sparse patch.
pub async fn update_status(
    State(state): State<AppState>,
    Path(prompt_id): Path<Uuid>,
    body: Bytes,
) -> Response {
    let patch: StatusPatch = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(err) => return api_error(StatusCode::BAD_REQUEST, format!("invalid patch: {err}")),
    };
    state.status.update(prompt_id, &patch);
    StatusCode::NON_AUTHORITATIVE_INFORMATION.into_response()
}

/// `GET /status/{promptId}/live` — upgrade to WebSocket.
pub async fn live(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(prompt_id): Path<Uuid>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, prompt_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, prompt_id: Uuid) {
    let reference = Uuid::new_v4();
    let (mut ws_sink, mut ws_stream) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.status.subscribe(prompt_id, reference, tx);
    tracing::debug!(%prompt_id, %reference, "status subscriber connected");

    // Writer task: forwards store publications to the socket.
    let writer = tokio::spawn(async move {
        while let Some(status) = rx.recv().await {
            let json = match serde_json::to_string(&status) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(%err, "status serialization failed");
                    continue;
                }
            };
            if ws_sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Reader loop: we only care about the peer going away.
    while let Some(Ok(msg)) = ws_stream.next().await {
        if matches!(msg, Message::Close(_)) {
            break;
        }
    }

    state.status.unsubscribe(prompt_id, reference);
    writer.abort();
    tracing::debug!(%prompt_id, %reference, "status subscriber disconnected");
}
