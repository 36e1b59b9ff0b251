//! Server application state shared across handlers

use super::events::{BroadcastObserver, EventBroadcaster};
use crate::backlog::SprintBoard;
use crate::chat::{AssistantTransport, ChatSession};
use crate::config::GatewayConfig;
use crate::shutdown::ShutdownState;
use std::sync::{Arc, Mutex};

/// Shared state for the server: the board, the chat session, and the
/// connections they talk through.
#[derive(Clone)]
pub struct ServerAppState {
    /// Backlog, team and derived metrics
    pub board: Arc<Mutex<SprintBoard>>,

    /// Copilot conversation shown in the dashboard
    pub session: Arc<Mutex<ChatSession>>,

    /// How dashboard chat turns reach the copilot
    pub transport: Arc<dyn AssistantTransport>,

    /// Gateway settings used by the relay endpoint
    pub gateway: Arc<GatewayConfig>,

    /// HTTP client for gateway calls
    pub http: reqwest::Client,

    /// Event broadcaster for WebSocket clients
    pub broadcaster: Arc<EventBroadcaster>,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl ServerAppState {
    /// State around the seeded demo board
    pub fn new(
        gateway: GatewayConfig,
        transport: Arc<dyn AssistantTransport>,
        shutdown_state: ShutdownState,
    ) -> Self {
        Self::with_board(SprintBoard::seeded(), gateway, transport, shutdown_state)
    }

    pub fn with_board(
        board: SprintBoard,
        gateway: GatewayConfig,
        transport: Arc<dyn AssistantTransport>,
        shutdown_state: ShutdownState,
    ) -> Self {
        let broadcaster = Arc::new(EventBroadcaster::new());
        let observer = Arc::new(BroadcastObserver::new(broadcaster.clone()));

        Self {
            board: Arc::new(Mutex::new(board)),
            session: Arc::new(Mutex::new(ChatSession::new(observer))),
            transport,
            gateway: Arc::new(gateway),
            http: reqwest::Client::new(),
            broadcaster,
            shutdown_state,
        }
    }
}
