//! Sprint board: the backlog plus everything derived from it
//!
//! Mutations only mark metrics stale. Metrics and the burndown are
//! recalculated the next time either is read.

use super::metrics::{self, MemberWorkload};
use super::{seed, BacklogStore, BoardError};
use crate::models::{RiskDataPoint, SprintMetrics, StoryUpdate, TeamMember, UserStory};
use serde::{Deserialize, Serialize};

/// Stories and metrics as of one moment, used as assistant context
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub stories: Vec<UserStory>,
    pub metrics: SprintMetrics,
}

#[derive(Debug, Clone)]
pub struct SprintBoard {
    backlog: BacklogStore,
    team: Vec<TeamMember>,
    metrics: SprintMetrics,
    burndown_baseline: Vec<RiskDataPoint>,
    risk_burndown: Vec<RiskDataPoint>,
    metrics_stale: bool,
}

impl SprintBoard {
    pub fn new(
        stories: Vec<UserStory>,
        team: Vec<TeamMember>,
        metrics: SprintMetrics,
        burndown: Vec<RiskDataPoint>,
    ) -> Self {
        Self {
            backlog: BacklogStore::from_stories(stories),
            team,
            metrics,
            risk_burndown: burndown.clone(),
            burndown_baseline: burndown,
            metrics_stale: false,
        }
    }

    /// Board populated with the demo sprint
    pub fn seeded() -> Self {
        Self::new(
            seed::initial_stories(),
            seed::team_members(),
            seed::sprint_metrics(),
            seed::risk_burndown(),
        )
    }

    pub fn stories(&self) -> &[UserStory] {
        self.backlog.stories()
    }

    pub fn story(&self, id: &str) -> Option<&UserStory> {
        self.backlog.get(id)
    }

    pub fn team(&self) -> &[TeamMember] {
        &self.team
    }

    pub fn add_story(&mut self, story: UserStory) -> Result<(), BoardError> {
        self.backlog.add(story)?;
        self.metrics_stale = true;
        Ok(())
    }

    pub fn remove_story(&mut self, id: &str) -> Result<UserStory, BoardError> {
        let removed = self.backlog.remove(id)?;
        self.metrics_stale = true;
        Ok(removed)
    }

    pub fn update_story(&mut self, id: &str, updates: StoryUpdate) -> Result<UserStory, BoardError> {
        let updated = self.backlog.update(id, updates)?.clone();
        self.metrics_stale = true;
        Ok(updated)
    }

    pub fn reorder_story(&mut self, id: &str, to_index: usize) -> Result<(), BoardError> {
        self.backlog.reorder(id, to_index)
    }

    /// Remove `target_id` (if still present) and append `replacements` in one step.
    ///
    /// Replacement ids are checked before anything is touched, so either the
    /// whole swap happens or the board is left unchanged.
    pub fn replace_story(
        &mut self,
        target_id: &str,
        replacements: Vec<UserStory>,
    ) -> Result<Option<UserStory>, BoardError> {
        for (idx, story) in replacements.iter().enumerate() {
            let clashes_backlog = story.id != target_id && self.backlog.get(&story.id).is_some();
            let clashes_batch = replacements[..idx].iter().any(|s| s.id == story.id);
            if clashes_backlog || clashes_batch {
                return Err(BoardError::DuplicateStory(story.id.clone()));
            }
        }

        let removed = self.backlog.remove(target_id).ok();
        for story in replacements {
            self.backlog.add(story)?;
        }
        self.metrics_stale = true;
        Ok(removed)
    }

    pub fn is_metrics_stale(&self) -> bool {
        self.metrics_stale
    }

    /// Current metrics, recalculated first if the backlog changed
    pub fn metrics(&mut self) -> SprintMetrics {
        self.refresh_metrics();
        self.metrics
    }

    pub fn risk_burndown(&mut self) -> &[RiskDataPoint] {
        self.refresh_metrics();
        &self.risk_burndown
    }

    pub fn team_workload(&self) -> Vec<MemberWorkload> {
        metrics::team_workload(&self.team)
    }

    pub fn snapshot(&mut self) -> BoardSnapshot {
        BoardSnapshot {
            metrics: self.metrics(),
            stories: self.backlog.stories().to_vec(),
        }
    }

    fn refresh_metrics(&mut self) {
        if !self.metrics_stale {
            return;
        }
        self.metrics = metrics::recalculate(self.backlog.stories(), &self.metrics);
        self.risk_burndown =
            metrics::project_burndown(&self.burndown_baseline, self.metrics.risk_score);
        self.metrics_stale = false;
        log::debug!(
            "Metrics recalculated: {} committed points, risk score {}",
            self.metrics.committed_points,
            self.metrics.risk_score
        );
    }
}

impl Default for SprintBoard {
    fn default() -> Self {
        Self::seeded()
    }
}
