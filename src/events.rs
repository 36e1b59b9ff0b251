// Event types and payload structures for real-time updates
// These are broadcast via WebSocket to connected clients

use crate::models::{ChatMessage, RiskDataPoint, SprintMetrics, UserStory};
use serde::{Deserialize, Serialize};

// Chat session events
pub const EVENT_CHAT_MESSAGE_APPENDED: &str = "chat:message_appended";
pub const EVENT_CHAT_MESSAGE_UPDATED: &str = "chat:message_updated";
pub const EVENT_CHAT_MESSAGE_REMOVED: &str = "chat:message_removed";
pub const EVENT_CHAT_TYPING_CHANGED: &str = "chat:typing_changed";

// Board events
pub const EVENT_BOARD_STORIES_CHANGED: &str = "board:stories_changed";
pub const EVENT_BOARD_METRICS_CHANGED: &str = "board:metrics_changed";

/// Payload for chat:message_appended
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAppendedPayload {
    pub message: ChatMessage,
}

/// Payload for chat:message_updated.
/// `id` is the id clients currently hold; it differs from `message.id` when a
/// streamed reply is finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdatedPayload {
    pub id: String,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRemovedPayload {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingChangedPayload {
    pub is_typing: bool,
}

/// Payload for board:stories_changed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoriesChangedPayload {
    pub stories: Vec<UserStory>,
}

/// Payload for board:metrics_changed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsChangedPayload {
    pub metrics: SprintMetrics,
    pub risk_burndown: Vec<RiskDataPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    #[test]
    fn test_payloads_use_camel_case() {
        let typing = serde_json::to_value(TypingChangedPayload { is_typing: true }).unwrap();
        assert_eq!(typing["isTyping"], true);

        let updated = serde_json::to_value(MessageUpdatedPayload {
            id: "streaming-1".to_string(),
            message: ChatMessage::new(MessageRole::Assistant, "Hi"),
        })
        .unwrap();
        assert_eq!(updated["id"], "streaming-1");
        assert_eq!(updated["message"]["content"], "Hi");
    }
}
