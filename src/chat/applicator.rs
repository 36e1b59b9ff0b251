// Applies an accepted breakdown to the board and confirms it in the chat

use super::session::ChatSession;
use crate::backlog::{BoardError, SprintBoard};
use crate::models::{ChatAction, ChatMessage, UserStory};
use crate::utils::lock_mutex_recover;
use chrono::Utc;
use std::fmt::Write as _;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Message {0} has no action to apply")]
    NoAction(String),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// What a breakdown changed
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownResult {
    pub target_story_id: String,
    pub removed: Option<UserStory>,
    pub added: Vec<UserStory>,
    pub confirmation: ChatMessage,
}

/// Swap the target story for the action's replacements, then post a summary
pub fn apply_breakdown(
    board: &mut SprintBoard,
    session: &mut ChatSession,
    action: &ChatAction,
) -> Result<BreakdownResult, ApplyError> {
    let now = Utc::now();
    let stamp = now.timestamp_millis();
    let added: Vec<UserStory> = action
        .replacement_stories
        .iter()
        .cloned()
        .enumerate()
        .map(|(idx, draft)| draft.into_story(format!("story-new-{}-{}", stamp, idx), now))
        .collect();

    let removed = board.replace_story(&action.target_story_id, added.clone())?;
    log::info!(
        "Applied breakdown of {}: removed {}, added {} stories",
        action.target_story_id,
        removed.is_some(),
        added.len()
    );

    let text = confirmation_text(&action.target_story_id, removed.as_ref(), &added);
    let confirmation = session.add_system_message(text);

    Ok(BreakdownResult {
        target_story_id: action.target_story_id.clone(),
        removed,
        added,
        confirmation,
    })
}

/// Look up the action attached to `message_id` and apply it.
///
/// Takes the board lock before the session lock.
pub fn apply_message_action(
    board: &Mutex<SprintBoard>,
    session: &Mutex<ChatSession>,
    message_id: &str,
) -> Result<BreakdownResult, ApplyError> {
    let mut board = lock_mutex_recover(board);
    let mut session = lock_mutex_recover(session);

    let action = session
        .message(message_id)
        .ok_or_else(|| ApplyError::MessageNotFound(message_id.to_string()))?
        .action
        .clone()
        .ok_or_else(|| ApplyError::NoAction(message_id.to_string()))?;

    apply_breakdown(&mut board, &mut session, &action)
}

pub fn confirmation_text(target_id: &str, removed: Option<&UserStory>, added: &[UserStory]) -> String {
    let mut text = String::from("✅ **Breakdown Applied!**\n\nI've updated the backlog:\n");
    match removed {
        Some(story) => {
            let _ = writeln!(text, "- Removed \"{}\" ({} pts)", story.title, story.story_points);
        }
        None => {
            let _ = writeln!(text, "- Removed story {} (no longer in backlog)", target_id);
        }
    }
    for story in added {
        let _ = writeln!(text, "- Added \"{}\" ({} pts)", story.title, story.story_points);
    }
    text.push_str("\nYour capacity utilization has been recalculated for the updated backlog.");
    text
}
