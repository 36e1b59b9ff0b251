//! HTTP/WebSocket server for the SprintPilot dashboard
//!
//! Serves the dashboard command proxy, the event stream, and the copilot
//! relay that forwards chat turns to the model gateway.

mod events;
mod proxy;
pub mod relay;
pub mod routes;
pub mod state;

pub use events::{BroadcastObserver, EventBroadcaster, ServerEvent};
pub use proxy::{invoke_handler, InvokeRequest, InvokeResponse};
pub use relay::RelayError;
pub use state::ServerAppState;

use crate::config::COPILOT_PATH;
use axum::{
    http::{
        header::{HeaderName, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue,
    },
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Version information for the server
#[derive(serde::Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

/// Headers browsers send to the relay alongside the JSON body
fn allowed_headers() -> [HeaderName; 5] {
    [
        AUTHORIZATION,
        CONTENT_TYPE,
        ACCEPT,
        HeaderName::from_static("x-client-info"),
        HeaderName::from_static("apikey"),
    ]
}

fn cors_layer(cors_origins: Option<&[String]>) -> CorsLayer {
    match cors_origins {
        Some(origins) if !origins.is_empty() => {
            // Restricted CORS: only allow specified origins
            let allowed_origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods(Any)
                .allow_headers(allowed_headers())
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(allowed_headers()),
    }
}

/// Build the application router with every endpoint mounted
pub fn build_router(state: ServerAppState, cors_origins: Option<&[String]>) -> Router {
    Router::new()
        .route("/api/invoke", post(proxy::invoke_handler))
        .route("/ws/events", get(events::ws_handler))
        .route(COPILOT_PATH, post(relay::copilot_handler))
        .route("/health", get(health_handler))
        .route("/api/version", get(version_handler))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Run the HTTP/WebSocket server until shutdown is requested
pub async fn run_server(
    port: u16,
    bind: &str,
    state: ServerAppState,
    cors_origins: Option<Vec<String>>,
) -> Result<(), String> {
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let shutdown_state = state.shutdown_state.clone();
    let key_status = if state.gateway.api_key.is_some() {
        "configured"
    } else {
        "MISSING (relay will return 500)"
    };
    let model = state.gateway.model.clone();
    let app = build_router(state, cors_origins.as_deref());

    let cors_display = match &cors_origins {
        Some(origins) if !origins.is_empty() => origins.join(", "),
        _ => "*".to_string(),
    };

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     SprintPilot Server                       ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("  Server URL:   http://{}:{}", bind, port);
    println!("  CORS Origins: {}", cors_display);
    println!("  Model:        {}", model);
    println!("  API Key:      {}", key_status);
    println!();
    println!("  Endpoints:");
    println!("    POST /api/invoke      - Dashboard commands");
    println!("    POST {}  - Copilot relay", COPILOT_PATH);
    println!("    GET  /ws/events       - WebSocket events");
    println!("    GET  /api/version     - Server version info");
    println!("    GET  /health          - Health check");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_state.wait().await })
        .await
        .map_err(|e| format!("Server error: {}", e))
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Version endpoint
async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
