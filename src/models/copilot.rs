// Copilot request body - the user's message plus a reduced board snapshot

use super::{Priority, RiskLevel, SprintMetrics, UserStory};
use serde::{Deserialize, Serialize};

/// Story fields the assistant needs to reason about the backlog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryContext {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub story_points: u32,
    pub priority: Priority,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub is_vague: bool,
}

impl From<&UserStory> for StoryContext {
    fn from(story: &UserStory) -> Self {
        Self {
            id: story.id.clone(),
            title: story.title.clone(),
            description: story.description.clone(),
            story_points: story.story_points,
            priority: story.priority,
            risk_level: story.risk_level,
            is_vague: story.is_vague,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsContext {
    pub velocity: u32,
    pub capacity: u32,
    pub committed_points: u32,
    pub risk_score: u32,
}

impl From<&SprintMetrics> for MetricsContext {
    fn from(metrics: &SprintMetrics) -> Self {
        Self {
            velocity: metrics.velocity,
            capacity: metrics.capacity,
            committed_points: metrics.committed_points,
            risk_score: metrics.risk_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopilotRequest {
    pub message: String,
    #[serde(default)]
    pub stories: Vec<StoryContext>,
    pub metrics: MetricsContext,
}

impl CopilotRequest {
    pub fn new(message: impl Into<String>, stories: &[UserStory], metrics: &SprintMetrics) -> Self {
        Self {
            message: message.into(),
            stories: stories.iter().map(StoryContext::from).collect(),
            metrics: MetricsContext::from(metrics),
        }
    }
}
