// Runtime configuration for the copilot relay and the dashboard client

pub mod secrets;

pub use secrets::SecretsConfig;

/// OpenAI-compatible chat-completions endpoint the relay forwards to
pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_PORT: u16 = 3420;
/// Path the relay is mounted at
pub const COPILOT_PATH: &str = "/functions/v1/sprint-copilot";

/// Where and how the relay reaches the model gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl GatewayConfig {
    pub fn new(url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Fill a missing API key from the secrets file
    pub fn with_secrets_fallback(mut self, secrets: &SecretsConfig) -> Self {
        if self.api_key.is_none() {
            self.api_key = secrets.api_key().map(String::from);
            if self.api_key.is_some() {
                log::info!("Using gateway API key from secrets file");
            }
        }
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_URL, DEFAULT_MODEL, None)
    }
}

/// Relay URL for a server listening on `port` on this machine
pub fn local_copilot_url(port: u16) -> String {
    format!("http://127.0.0.1:{}{}", port, COPILOT_PATH)
}
