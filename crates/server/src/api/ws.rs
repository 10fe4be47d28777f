//! WebSocket stream of seat events for one session.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use boxoffice_core::SeatEvent;

use super::handlers::{error_response, ApiError};
use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// GET /api/v1/sessions/{id}/ws
///
/// Every `SeatEvent` the session's engine emits is sent as a JSON text frame.
pub async fn session_ws(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.session(id).await.ok_or_else(|| {
        error_response(
            axum::http::StatusCode::NOT_FOUND,
            format!("Session not found: {}", id),
        )
    })?;

    // Deleting the session drops every sender and ends the stream
    let rx = session.subscribe();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, id, rx)))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, id: Uuid, mut rx: broadcast::Receiver<SeatEvent>) {
    let (mut sender, mut receiver) = socket.split();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("WebSocket client connected to session {}", id);

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    WS_MESSAGES_SENT.with_label_values(&[event.kind()]).inc();

                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                debug!("WebSocket send failed, client disconnected");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize SeatEvent: {}", e);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged, skipped {} events", n);
                    WS_LAG_EVENTS.inc();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Session closed, ending event stream");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Clients only need to send close frames; pings are answered by axum
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("WebSocket client requested close");
                    break;
                }
                Ok(Message::Text(text)) => {
                    debug!("Ignoring client text message: {}", text);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected from session {}", id);
}
