// Transport to the copilot relay - one POST per turn, answered with an SSE body

use crate::models::CopilotRequest;
use crate::parsers::decode_stream;
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::{FutureExt, StreamExt, TryStreamExt};
use thiserror::Error;

/// Ordered text deltas of one streamed reply
pub type DeltaStream = BoxStream<'static, Result<String, TransportError>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be made or the request was refused
    #[error("{0}")]
    Request(String),

    /// Relay answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Body stream broke after the reply started
    #[error("{0}")]
    Read(String),
}

/// Something that can turn a copilot request into a stream of reply deltas
pub trait AssistantTransport: Send + Sync {
    fn stream_reply<'a>(
        &'a self,
        request: &'a CopilotRequest,
    ) -> BoxFuture<'a, Result<DeltaStream, TransportError>>;
}

/// Message for a non-success response: the body's `error` field when present
pub fn status_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("error").and_then(|e| e.as_str()).map(String::from))
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Transport posting to the relay endpoint over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            bearer_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn open_stream(&self, request: &CopilotRequest) -> Result<DeltaStream, TransportError> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(token) = &self.bearer_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("Failed to reach copilot: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = status_message(status.as_u16(), &body);
            log::warn!("Copilot request failed ({}): {}", status, message);
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        log::debug!("Copilot stream opened ({})", self.endpoint);
        let bytes = response
            .bytes_stream()
            .map_err(|e| TransportError::Read(format!("Stream interrupted: {}", e)))
            .boxed();
        Ok(decode_stream(bytes).boxed())
    }
}

impl AssistantTransport for HttpTransport {
    fn stream_reply<'a>(
        &'a self,
        request: &'a CopilotRequest,
    ) -> BoxFuture<'a, Result<DeltaStream, TransportError>> {
        self.open_stream(request).boxed()
    }
}
