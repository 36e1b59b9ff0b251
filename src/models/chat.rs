// Copilot chat models - messages and the actions attached to them

use super::StoryDraft;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Id of the greeting message seeded into every new session
pub const GREETING_MESSAGE_ID: &str = "initial";

/// Prefix marking an assistant message still being streamed
pub const PROVISIONAL_ID_PREFIX: &str = "streaming-";

// ============================================================================
// Message Role Enum
// ============================================================================

/// Chat message author. Serializes as lowercase strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Kinds of instruction the assistant may embed in a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Breakdown,
}

impl ActionKind {
    /// Button label shown next to the message
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Breakdown => "Apply Breakdown",
        }
    }
}

/// A validated instruction parsed from an assistant reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAction {
    pub kind: ActionKind,
    pub label: String,
    pub target_story_id: String,
    pub replacement_stories: Vec<StoryDraft>,
}

impl ChatAction {
    pub fn breakdown(target_story_id: impl Into<String>, stories: Vec<StoryDraft>) -> Self {
        Self {
            kind: ActionKind::Breakdown,
            label: ActionKind::Breakdown.label().to_string(),
            target_story_id: target_story_id.into(),
            replacement_stories: stories,
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ChatAction>,
}

impl ChatMessage {
    /// A finalized message with a fresh `msg-` id
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            action: None,
        }
    }

    /// An assistant message under construction from streamed deltas
    pub fn provisional(content: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", PROVISIONAL_ID_PREFIX, uuid::Uuid::new_v4()),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            action: None,
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.id.starts_with(PROVISIONAL_ID_PREFIX)
    }
}

/// Id for a finalized message
pub fn new_message_id() -> String {
    format!("msg-{}", uuid::Uuid::new_v4())
}
