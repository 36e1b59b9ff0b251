//! Chat session state: message history and the typing flag
//!
//! A session is driven through short, synchronous steps (`try_begin_turn`,
//! `append_delta`, then exactly one of `finish_turn` / `fail_turn`) so callers
//! can hold its lock for one step at a time and release it while awaiting the
//! network.

use crate::backlog::seed;
use crate::events::{
    EVENT_CHAT_MESSAGE_APPENDED, EVENT_CHAT_MESSAGE_REMOVED, EVENT_CHAT_MESSAGE_UPDATED,
    EVENT_CHAT_TYPING_CHANGED,
};
use crate::models::{new_message_id, ChatAction, ChatMessage, MessageRole, GREETING_MESSAGE_ID};
use crate::parsers::{display_filter, extract_action, provisional_filter};
use std::sync::Arc;

/// State change notification
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MessageAppended(ChatMessage),
    /// The message known as `id` now reads `message`. A finalized reply keeps
    /// the provisional id here while `message` carries its new id.
    MessageUpdated { id: String, message: ChatMessage },
    MessageRemoved { id: String },
    TypingChanged(bool),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::MessageAppended(_) => EVENT_CHAT_MESSAGE_APPENDED,
            SessionEvent::MessageUpdated { .. } => EVENT_CHAT_MESSAGE_UPDATED,
            SessionEvent::MessageRemoved { .. } => EVENT_CHAT_MESSAGE_REMOVED,
            SessionEvent::TypingChanged(_) => EVENT_CHAT_TYPING_CHANGED,
        }
    }
}

/// Receives every state change of a session
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: &SessionEvent);
}

/// Observer that drops all notifications
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_event(&self, _event: &SessionEvent) {}
}

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    is_typing: bool,
    /// Raw assistant text received during the current turn
    reply_buffer: String,
    observer: Arc<dyn SessionObserver>,
}

impl ChatSession {
    /// New session holding only the greeting
    pub fn new(observer: Arc<dyn SessionObserver>) -> Self {
        let greeting = ChatMessage {
            id: GREETING_MESSAGE_ID.to_string(),
            ..ChatMessage::new(MessageRole::Assistant, seed::GREETING)
        };
        Self {
            messages: vec![greeting],
            is_typing: false,
            reply_buffer: String::new(),
            observer,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// Action attached to the most recent message that carries one
    pub fn last_action(&self) -> Option<&ChatAction> {
        self.messages.iter().rev().find_map(|m| m.action.as_ref())
    }

    /// Start a turn: record the user's message and mark the assistant as typing.
    ///
    /// Returns the trimmed text to send, or `None` when the input is blank or a
    /// reply is already streaming; history is untouched in that case.
    pub fn try_begin_turn(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.is_typing {
            log::debug!("Ignoring message while a reply is streaming");
            return None;
        }

        self.push(ChatMessage::new(MessageRole::User, text));
        self.reply_buffer.clear();
        self.set_typing(true);
        Some(text.to_string())
    }

    /// Feed one streamed fragment into the provisional reply
    pub fn append_delta(&mut self, delta: &str) {
        if !self.is_typing {
            log::warn!("Dropping delta received outside of a turn");
            return;
        }
        self.reply_buffer.push_str(delta);
        let view = provisional_filter(&self.reply_buffer);

        let Some(index) = self.provisional_index() else {
            self.push(ChatMessage::provisional(view));
            return;
        };

        let current = &self.messages[index].content;
        if view.len() > current.len() && view.starts_with(current.as_str()) {
            self.messages[index].content = view;
            let message = self.messages[index].clone();
            self.notify(SessionEvent::MessageUpdated {
                id: message.id.clone(),
                message,
            });
        }
    }

    /// Close the turn successfully, finalizing the provisional reply if any
    pub fn finish_turn(&mut self) -> Option<ChatMessage> {
        let raw = std::mem::take(&mut self.reply_buffer);
        let finalized = self.provisional_index().map(|index| {
            let provisional = &mut self.messages[index];
            let previous_id = std::mem::replace(&mut provisional.id, new_message_id());
            provisional.content = display_filter(&raw);
            provisional.action = extract_action(&raw);
            (previous_id, provisional.clone())
        });

        let result = finalized.map(|(previous_id, message)| {
            if let Some(action) = &message.action {
                log::info!(
                    "Assistant proposed a breakdown of {} into {} stories",
                    action.target_story_id,
                    action.replacement_stories.len()
                );
            }
            self.notify(SessionEvent::MessageUpdated {
                id: previous_id,
                message: message.clone(),
            });
            message
        });

        self.set_typing(false);
        result
    }

    /// Close the turn with a transport failure
    pub fn fail_turn(&mut self, reason: &str) -> ChatMessage {
        self.reply_buffer.clear();
        if let Some(index) = self.provisional_index() {
            let removed = self.messages.remove(index);
            self.notify(SessionEvent::MessageRemoved { id: removed.id });
        }

        let message = ChatMessage::new(MessageRole::Assistant, error_reply(reason));
        self.push(message.clone());
        self.set_typing(false);
        message
    }

    /// Append a finalized assistant message with no action
    pub fn add_system_message(&mut self, text: impl Into<String>) -> ChatMessage {
        let message = ChatMessage::new(MessageRole::Assistant, text);
        self.push(message.clone());
        message
    }

    fn provisional_index(&self) -> Option<usize> {
        self.messages.iter().rposition(|m| m.is_provisional())
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message.clone());
        self.notify(SessionEvent::MessageAppended(message));
    }

    fn set_typing(&mut self, typing: bool) {
        if self.is_typing != typing {
            self.is_typing = typing;
            self.notify(SessionEvent::TypingChanged(typing));
        }
    }

    fn notify(&self, event: SessionEvent) {
        self.observer.on_event(&event);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(Arc::new(NoopObserver))
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("messages", &self.messages.len())
            .field("is_typing", &self.is_typing)
            .finish()
    }
}

/// Text shown in place of a reply that failed to arrive
pub fn error_reply(reason: &str) -> String {
    format!("I encountered an error: {}. Please try again.", reason)
}
