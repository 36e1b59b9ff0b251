// Action block parser - separates assistant narrative from the fenced
// ```action block the model may append, and parses that block

use crate::models::{draft_defaults, ChatAction, Priority, StoryDraft};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Opening fence of an action block
pub const ACTION_FENCE: &str = "```action";

static ACTION_BLOCK: OnceLock<Regex> = OnceLock::new();

fn action_block_regex() -> &'static Regex {
    ACTION_BLOCK.get_or_init(|| Regex::new(r"```action\r?\n([\s\S]*?)\r?\n```").unwrap())
}

/// Remove every complete action block and trim the remainder
pub fn display_filter(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let stripped = action_block_regex().replace_all(&current, "");
        let next = stripped.trim();
        if next == current {
            return current;
        }
        current = next.to_string();
    }
}

/// View of a partially streamed response.
///
/// Like [`display_filter`], but also hides an action block whose closing
/// fence has not arrived yet and any trailing prefix of an opening fence.
pub fn provisional_filter(text: &str) -> String {
    let filtered = display_filter(text);
    let visible = match filtered.find(ACTION_FENCE) {
        Some(idx) => &filtered[..idx],
        None => strip_partial_fence(&filtered),
    };
    visible.trim_end().to_string()
}

fn strip_partial_fence(text: &str) -> &str {
    for len in (1..ACTION_FENCE.len()).rev() {
        if text.ends_with(&ACTION_FENCE[..len]) {
            return &text[..text.len() - len];
        }
    }
    text
}

/// Body of the first action block, if any
pub fn extract_action_block(text: &str) -> Option<&str> {
    action_block_regex()
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// Parse the first action block into a validated action.
///
/// Anything unexpected (bad JSON, unknown type, missing target or story list)
/// yields `None`.
pub fn extract_action(text: &str) -> Option<ChatAction> {
    let body = extract_action_block(text)?;

    let json: Value = match serde_json::from_str(body.trim()) {
        Ok(json) => json,
        Err(e) => {
            log::debug!("Ignoring malformed action block: {}", e);
            return None;
        }
    };

    match json.get("type").and_then(|v| v.as_str()) {
        Some("breakdown") => {}
        other => {
            log::debug!("Ignoring action block with type {:?}", other);
            return None;
        }
    }

    let story_id = json
        .get("storyId")
        .and_then(|v| v.as_str())
        .filter(|id| !id.trim().is_empty())?;
    let new_stories = json.get("newStories").and_then(|v| v.as_array())?;

    let drafts = new_stories.iter().map(parse_draft).collect();
    Some(ChatAction::breakdown(story_id, drafts))
}

/// Replacement story with defaults filled in for missing or unusable fields
fn parse_draft(value: &Value) -> StoryDraft {
    let title = value
        .get("title")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(draft_defaults::TITLE);

    let description = value
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    // Models occasionally emit 2.0 or "3"
    let story_points = value
        .get("storyPoints")
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|p| p.is_finite() && *p >= 1.0)
        .map(|p| p.round().min(f64::from(draft_defaults::MAX_STORY_POINTS)) as u32)
        .unwrap_or(draft_defaults::STORY_POINTS);

    let priority = value
        .get("priority")
        .and_then(|v| v.as_str())
        .and_then(|p| p.parse::<Priority>().ok())
        .unwrap_or_default();

    StoryDraft {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        story_points: Some(story_points),
        priority: Some(priority),
    }
}
