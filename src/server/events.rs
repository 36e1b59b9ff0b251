//! WebSocket event broadcaster for real-time updates
//!
//! Bridges chat session notifications and board changes to WebSocket clients.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::ServerAppState;
use crate::backlog::SprintBoard;
use crate::chat::{SessionEvent, SessionObserver};
use crate::events::{
    MessageAppendedPayload, MessageRemovedPayload, MessageUpdatedPayload, MetricsChangedPayload,
    StoriesChangedPayload, TypingChangedPayload, EVENT_BOARD_METRICS_CHANGED,
    EVENT_BOARD_STORIES_CHANGED,
};

/// A server event that can be broadcast to WebSocket clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEvent {
    /// Event type (e.g., "chat:message_updated", "board:metrics_changed")
    pub event: String,
    /// Event payload as JSON value
    pub payload: serde_json::Value,
}

/// Broadcasts events to all connected WebSocket clients
pub struct EventBroadcaster {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventBroadcaster {
    /// Create a new event broadcaster with a channel capacity of 1000 events
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1000);
        Self { tx }
    }

    /// Broadcast an event to all connected clients
    pub fn broadcast(&self, event_type: &str, payload: impl Serialize) {
        let event = ServerEvent {
            event: event_type.to_string(),
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        };

        // Ignore send errors (no receivers)
        let _ = self.tx.send(event);
    }

    /// Subscribe to events (returns a receiver)
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Announce the board's current stories and metrics
    pub fn broadcast_board(&self, board: &mut SprintBoard) {
        self.broadcast(
            EVENT_BOARD_STORIES_CHANGED,
            StoriesChangedPayload {
                stories: board.stories().to_vec(),
            },
        );
        self.broadcast(
            EVENT_BOARD_METRICS_CHANGED,
            MetricsChangedPayload {
                metrics: board.metrics(),
                risk_burndown: board.risk_burndown().to_vec(),
            },
        );
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Session observer forwarding chat changes to the broadcaster
pub struct BroadcastObserver {
    broadcaster: Arc<EventBroadcaster>,
}

impl BroadcastObserver {
    pub fn new(broadcaster: Arc<EventBroadcaster>) -> Self {
        Self { broadcaster }
    }
}

impl SessionObserver for BroadcastObserver {
    fn on_event(&self, event: &SessionEvent) {
        let name = event.name();
        match event {
            SessionEvent::MessageAppended(message) => self.broadcaster.broadcast(
                name,
                MessageAppendedPayload {
                    message: message.clone(),
                },
            ),
            SessionEvent::MessageUpdated { id, message } => self.broadcaster.broadcast(
                name,
                MessageUpdatedPayload {
                    id: id.clone(),
                    message: message.clone(),
                },
            ),
            SessionEvent::MessageRemoved { id } => {
                self.broadcaster
                    .broadcast(name, MessageRemovedPayload { id: id.clone() })
            }
            SessionEvent::TypingChanged(is_typing) => self.broadcaster.broadcast(
                name,
                TypingChangedPayload {
                    is_typing: *is_typing,
                },
            ),
        }
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerAppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle a WebSocket connection
async fn handle_websocket(socket: WebSocket, state: ServerAppState) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the first await so no event is missed
    let mut event_rx = state.broadcaster.subscribe();

    log::info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("WebSocket client lagged, skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("Failed to serialize event: {}", e);
                }
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                log::info!("WebSocket client disconnected");
                break;
            }
            Ok(Message::Text(text)) => {
                // Clients only listen; incoming text is ignored
                log::debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("WebSocket error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    log::info!("WebSocket connection closed");
}
