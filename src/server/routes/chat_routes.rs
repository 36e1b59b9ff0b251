//! Copilot chat command routing
//!
//! Handles: get_chat_messages, send_chat_message, apply_breakdown

use crate::chat::{self, BreakdownResult, SendOutcome};
use crate::models::{ChatMessage, UserStory};
use crate::utils::lock_mutex_recover;
use serde::Serialize;
use serde_json::Value;

use super::{get_arg, to_value, ServerAppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub messages: Vec<ChatMessage>,
    pub is_typing: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAccepted {
    pub accepted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownView {
    pub target_story_id: String,
    pub removed: Option<UserStory>,
    pub added: Vec<UserStory>,
    pub confirmation: ChatMessage,
}

impl From<BreakdownResult> for BreakdownView {
    fn from(result: BreakdownResult) -> Self {
        Self {
            target_story_id: result.target_story_id,
            removed: result.removed,
            added: result.added,
            confirmation: result.confirmation,
        }
    }
}

/// Route chat-related commands
pub async fn route_chat_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "get_chat_messages" => {
            let session = lock_mutex_recover(&state.session);
            to_value(ChatView {
                messages: session.messages().to_vec(),
                is_typing: session.is_typing(),
            })
        }

        "send_chat_message" => {
            let content: String = get_arg(&args, "content")?;
            to_value(SendAccepted {
                accepted: spawn_chat_turn(state, &content),
            })
        }

        "apply_breakdown" => {
            let message_id: String = get_arg(&args, "messageId")?;
            let result = chat::apply_message_action(&state.board, &state.session, &message_id)
                .map_err(|e| e.to_string())?;
            state
                .broadcaster
                .broadcast_board(&mut lock_mutex_recover(&state.board));
            to_value(BreakdownView::from(result))
        }

        _ => Err(format!("Unknown chat command: {}", cmd)),
    }
}

/// Start a chat turn and stream its reply in the background. Progress reaches
/// clients through session events; the return value says whether the turn was
/// started.
fn spawn_chat_turn(state: &ServerAppState, content: &str) -> bool {
    let Some(message) = chat::begin_turn(&state.session, content) else {
        log::debug!("Chat message not accepted: blank or a reply is streaming");
        return false;
    };

    let state = state.clone();
    tokio::spawn(async move {
        let outcome = chat::stream_turn(
            &state.session,
            &state.board,
            state.transport.as_ref(),
            message,
        )
        .await;
        if let SendOutcome::Failed(e) = outcome {
            log::debug!("Background chat turn failed: {}", e);
        }
    });
    true
}

/// Check if a command is a chat command
pub fn is_chat_command(cmd: &str) -> bool {
    matches!(
        cmd,
        "get_chat_messages" | "send_chat_message" | "apply_breakdown"
    )
}
