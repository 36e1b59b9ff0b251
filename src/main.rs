use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sprint_pilot_lib::backlog::SprintBoard;
use sprint_pilot_lib::chat::{self, ChatSession, HttpTransport, SendOutcome, SessionEvent, SessionObserver};
use sprint_pilot_lib::config::{self, GatewayConfig, SecretsConfig};
use sprint_pilot_lib::server::{self, ServerAppState};
use sprint_pilot_lib::shutdown::{register_signal_handlers, ShutdownState};
use sprint_pilot_lib::utils::lock_mutex_recover;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// SprintPilot - sprint planning backend with a streaming AI copilot
#[derive(Parser, Debug)]
#[command(name = "sprint-pilot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the dashboard API server and copilot relay
    Serve(ServeArgs),
    /// Send one message to the copilot about the demo sprint
    Ask(AskArgs),
    /// Store the gateway API key in ~/.sprint-pilot/secrets.toml
    SetApiKey {
        /// Gateway API key
        key: String,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to bind the server to
    #[arg(long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Allowed CORS origin (repeatable). Any origin is allowed when omitted.
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    #[command(flatten)]
    gateway: GatewayArgs,
}

#[derive(Args, Debug)]
struct GatewayArgs {
    /// OpenAI-compatible chat completions endpoint
    #[arg(long, env = "SPRINT_PILOT_GATEWAY_URL", default_value = config::DEFAULT_GATEWAY_URL)]
    gateway_url: String,

    /// Model requested from the gateway
    #[arg(long, env = "SPRINT_PILOT_MODEL", default_value = config::DEFAULT_MODEL)]
    model: String,

    /// Gateway API key (falls back to ~/.sprint-pilot/secrets.toml)
    #[arg(long, env = "SPRINT_PILOT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Args, Debug)]
struct AskArgs {
    /// Copilot relay endpoint
    #[arg(long, env = "SPRINT_PILOT_RELAY_URL", default_value_t = config::local_copilot_url(config::DEFAULT_PORT))]
    relay_url: String,

    /// Bearer token sent to the relay
    #[arg(long, env = "SPRINT_PILOT_RELAY_TOKEN", hide_env_values = true)]
    relay_token: Option<String>,

    /// Apply a proposed breakdown to the board and print the confirmation
    #[arg(long)]
    apply: bool,

    /// Message for the copilot
    message: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::init();

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    match cli.command {
        Command::Serve(args) => rt.block_on(run_serve(args)),
        Command::Ask(args) => rt.block_on(run_ask(args)),
        Command::SetApiKey { key } => {
            let mut secrets = SecretsConfig::load()?;
            secrets.api_key = Some(key.trim().to_string());
            secrets.save()?;
            println!("API key saved");
            Ok(())
        }
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let shutdown_state = ShutdownState::new();
    if let Err(e) = register_signal_handlers(shutdown_state.clone()) {
        log::warn!("Failed to register signal handlers: {}", e);
    }

    let secrets = SecretsConfig::load().unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable secrets file: {}", e);
        SecretsConfig::default()
    });
    let gateway = GatewayConfig::new(args.gateway.gateway_url, args.gateway.model, args.gateway.api_key)
        .with_secrets_fallback(&secrets);
    if gateway.api_key.is_none() {
        log::warn!("No gateway API key configured; copilot requests will fail");
    }

    // Dashboard chat turns go through this server's own relay endpoint
    let transport = Arc::new(HttpTransport::new(config::local_copilot_url(args.port)));
    let state = ServerAppState::new(gateway, transport, shutdown_state);

    let cors_origins = (!args.cors_origins.is_empty()).then_some(args.cors_origins);
    server::run_server(args.port, &args.bind, state, cors_origins)
        .await
        .map_err(anyhow::Error::msg)
}

/// Prints the assistant's reply to stdout as it streams in
#[derive(Default)]
struct TerminalObserver {
    printed: Mutex<String>,
}

impl TerminalObserver {
    fn print_suffix(&self, content: &str) {
        let mut printed = lock_mutex_recover(&self.printed);
        if content.len() > printed.len() && content.starts_with(printed.as_str()) {
            print!("{}", &content[printed.len()..]);
            let _ = std::io::stdout().flush();
            *printed = content.to_string();
        }
    }
}

impl SessionObserver for TerminalObserver {
    fn on_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::MessageAppended(message) if message.is_provisional() => {
                self.print_suffix(&message.content)
            }
            SessionEvent::MessageUpdated { message, .. } => self.print_suffix(&message.content),
            _ => {}
        }
    }
}

async fn run_ask(args: AskArgs) -> Result<()> {
    let mut transport = HttpTransport::new(args.relay_url);
    if let Some(token) = args.relay_token {
        transport = transport.with_bearer_token(token);
    }

    let session = Mutex::new(ChatSession::new(Arc::new(TerminalObserver::default())));
    let board = Mutex::new(SprintBoard::seeded());

    match chat::send_message(&session, &board, &transport, &args.message).await {
        SendOutcome::Rejected => anyhow::bail!("Message is empty"),
        SendOutcome::Failed(e) => anyhow::bail!("Copilot request failed: {}", e),
        SendOutcome::Completed(None) => println!("(no reply)"),
        SendOutcome::Completed(Some(reply)) => {
            println!();
            let Some(action) = reply.action else {
                return Ok(());
            };
            println!(
                "\n[{}] {} -> {} new stories",
                action.label,
                action.target_story_id,
                action.replacement_stories.len()
            );
            if args.apply {
                let result = chat::apply_message_action(&board, &session, &reply.id)?;
                println!("\n{}", result.confirmation.content);
                let mut board = lock_mutex_recover(&board);
                let metrics = board.metrics();
                println!(
                    "Committed: {}/{} pts, risk score {}%",
                    metrics.committed_points, metrics.capacity, metrics.risk_score
                );
            }
        }
    }
    Ok(())
}
