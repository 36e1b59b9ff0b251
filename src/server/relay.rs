//! Copilot relay endpoint
//!
//! Accepts the dashboard's copilot request, renders the system prompt, and
//! forwards the conversation to the model gateway with streaming enabled.
//! A successful upstream body is relayed to the caller untouched.

use super::ServerAppState;
use crate::models::CopilotRequest;
use crate::templates::render_copilot_system_prompt;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Failures surfaced to relay callers as `{"error": "..."}`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("SPRINT_PILOT_API_KEY is not configured")]
    MissingApiKey,

    #[error("Rate limits exceeded, please try again later.")]
    RateLimited,

    #[error("AI usage limit reached. Please add credits to continue.")]
    PaymentRequired,

    #[error("AI gateway error")]
    Upstream { status: u16 },

    #[error("{0}")]
    Prompt(String),

    #[error("{0}")]
    Request(String),
}

impl RelayError {
    /// Map a non-success gateway status to the caller-facing error
    pub fn from_upstream_status(status: u16) -> Self {
        match status {
            429 => RelayError::RateLimited,
            402 => RelayError::PaymentRequired,
            _ => RelayError::Upstream { status },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RelayError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct GatewayMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Body posted to the OpenAI-compatible gateway
#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    model: &'a str,
    messages: [GatewayMessage<'a>; 2],
    stream: bool,
}

/// POST handler for the copilot relay
pub async fn copilot_handler(
    State(state): State<ServerAppState>,
    body: Bytes,
) -> Result<Response, RelayError> {
    let request: CopilotRequest = serde_json::from_slice(&body)
        .map_err(|e| RelayError::InvalidRequest(format!("Invalid request body: {}", e)))?;

    let api_key = state
        .gateway
        .api_key
        .as_deref()
        .ok_or(RelayError::MissingApiKey)?;

    let system_prompt = render_copilot_system_prompt(&request)
        .map_err(|e| RelayError::Prompt(format!("Failed to render prompt: {}", e)))?;

    let payload = GatewayRequest {
        model: &state.gateway.model,
        messages: [
            GatewayMessage {
                role: "system",
                content: &system_prompt,
            },
            GatewayMessage {
                role: "user",
                content: &request.message,
            },
        ],
        stream: true,
    };

    log::info!(
        "Relaying copilot request to gateway ({} stories in context)",
        request.stories.len()
    );

    let response = state
        .http
        .post(&state.gateway.url)
        .bearer_auth(api_key)
        .json(&payload)
        .send()
        .await
        .map_err(|e| RelayError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error = RelayError::from_upstream_status(status.as_u16());
        match &error {
            RelayError::Upstream { .. } => {
                let text = response.text().await.unwrap_or_default();
                log::error!("AI gateway error: {} {}", status, text);
            }
            other => log::warn!("Gateway refused request: {}", other),
        }
        return Err(error);
    }

    log::debug!("Streaming response from gateway");
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(response.bytes_stream()))
        .map_err(|e| RelayError::Request(e.to_string()))
}
