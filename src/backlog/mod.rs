// Backlog store, sprint metrics and the board that ties them together
//
// This module is organized into submodules:
// - metrics: pure metric formulas (committed points, risk score, burndown, workload)
// - board: SprintBoard, the owner of stories, team and derived metrics
// - seed: the demo "User Onboarding" sprint

pub mod board;
pub mod metrics;
pub mod seed;

pub use board::{BoardSnapshot, SprintBoard};
pub use metrics::{LoadLevel, MemberWorkload};

use crate::models::{StoryUpdate, UserStory};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Story not found: {0}")]
    StoryNotFound(String),

    #[error("Story already exists: {0}")]
    DuplicateStory(String),

    #[error("Index {index} out of range for backlog of {len} stories")]
    IndexOutOfRange { index: usize, len: usize },
}

/// In-memory ordered collection of stories. Order is display order.
#[derive(Debug, Clone, Default)]
pub struct BacklogStore {
    stories: Vec<UserStory>,
}

impl BacklogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stories(stories: Vec<UserStory>) -> Self {
        Self { stories }
    }

    pub fn stories(&self) -> &[UserStory] {
        &self.stories
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&UserStory> {
        self.stories.iter().find(|s| s.id == id)
    }

    /// Append a story; ids must be unique
    pub fn add(&mut self, story: UserStory) -> Result<(), BoardError> {
        if self.get(&story.id).is_some() {
            return Err(BoardError::DuplicateStory(story.id));
        }
        self.stories.push(story);
        Ok(())
    }

    /// Remove a story by id, returning it
    pub fn remove(&mut self, id: &str) -> Result<UserStory, BoardError> {
        let index = self.position(id)?;
        Ok(self.stories.remove(index))
    }

    pub fn update(&mut self, id: &str, updates: StoryUpdate) -> Result<&UserStory, BoardError> {
        let index = self.position(id)?;
        let story = &mut self.stories[index];
        updates.apply_to(story);
        Ok(story)
    }

    /// Move a story to `to_index` in the display order
    pub fn reorder(&mut self, id: &str, to_index: usize) -> Result<(), BoardError> {
        let len = self.stories.len();
        if to_index >= len {
            return Err(BoardError::IndexOutOfRange {
                index: to_index,
                len,
            });
        }
        let from = self.position(id)?;
        let story = self.stories.remove(from);
        self.stories.insert(to_index, story);
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize, BoardError> {
        self.stories
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| BoardError::StoryNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StoryDraft, StoryStatus};
    use chrono::Utc;

    fn story(id: &str) -> UserStory {
        StoryDraft {
            title: Some(format!("Story {}", id)),
            ..Default::default()
        }
        .into_story(id.to_string(), Utc::now())
    }

    fn ids(store: &BacklogStore) -> Vec<&str> {
        store.stories().iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_add_and_remove() {
        let mut store = BacklogStore::new();
        store.add(story("a")).unwrap();
        store.add(story("b")).unwrap();
        assert_eq!(store.len(), 2);

        let removed = store.remove("a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(ids(&store), vec!["b"]);
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut store = BacklogStore::new();
        store.add(story("a")).unwrap();
        assert_eq!(
            store.add(story("a")),
            Err(BoardError::DuplicateStory("a".to_string()))
        );
    }

    #[test]
    fn test_remove_missing() {
        let mut store = BacklogStore::new();
        assert_eq!(
            store.remove("nope").unwrap_err(),
            BoardError::StoryNotFound("nope".to_string())
        );
    }

    #[test]
    fn test_update() {
        let mut store = BacklogStore::from_stories(vec![story("a")]);
        let updated = store
            .update(
                "a",
                StoryUpdate {
                    status: Some(StoryStatus::Ready),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, StoryStatus::Ready);
    }

    #[test]
    fn test_reorder() {
        let mut store = BacklogStore::from_stories(vec![story("a"), story("b"), story("c")]);
        store.reorder("c", 0).unwrap();
        assert_eq!(ids(&store), vec!["c", "a", "b"]);
        store.reorder("c", 2).unwrap();
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut store = BacklogStore::from_stories(vec![story("a")]);
        assert_eq!(
            store.reorder("a", 3),
            Err(BoardError::IndexOutOfRange { index: 3, len: 1 })
        );
    }
}
