// Sprint models - stories, team members and sprint metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Enums
// ============================================================================

/// Story priority. Serializes as lowercase strings to match the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!(
                "Invalid priority: '{}'. Expected 'high', 'medium', or 'low'",
                s
            )),
        }
    }
}

/// Delivery risk of a story
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    #[default]
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow status of a story
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoryStatus {
    #[default]
    Backlog,
    Ready,
    InProgress,
    Done,
}

// ============================================================================
// Stories
// ============================================================================

/// A unit of planned work in the backlog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub story_points: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub status: StoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ai_insights: Vec<String>,
    #[serde(default)]
    pub is_vague: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Partial story descriptor proposed by the assistant.
///
/// Every field is optional; [`StoryDraft::into_story`] fills the gaps with the
/// backlog defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Defaults applied to drafts that omit fields
pub mod draft_defaults {
    pub const TITLE: &str = "New Story";
    /// Mid-size estimate used when the draft has no (or a zero) point value
    pub const STORY_POINTS: u32 = 3;
    /// Largest estimate a draft may carry
    pub const MAX_STORY_POINTS: u32 = 100;
    pub const INSIGHT: &str = "Created from AI breakdown";
}

impl StoryDraft {
    /// Title with the placeholder applied
    pub fn title_or_default(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => draft_defaults::TITLE,
        }
    }

    /// Points with the mid-size default applied
    pub fn points_or_default(&self) -> u32 {
        match self.story_points {
            Some(points) if points > 0 => points.min(draft_defaults::MAX_STORY_POINTS),
            _ => draft_defaults::STORY_POINTS,
        }
    }

    /// Materialize a full backlog story from this draft
    pub fn into_story(self, id: String, created_at: DateTime<Utc>) -> UserStory {
        UserStory {
            title: self.title_or_default().to_string(),
            story_points: self.points_or_default(),
            id,
            description: self.description.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            risk_level: RiskLevel::Low,
            status: StoryStatus::Backlog,
            assignee: None,
            dependencies: Vec::new(),
            ai_insights: vec![draft_defaults::INSIGHT.to_string()],
            is_vague: false,
            created_at,
        }
    }
}

/// Field-wise update for an existing story; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub story_points: Option<u32>,
    pub priority: Option<Priority>,
    pub risk_level: Option<RiskLevel>,
    pub status: Option<StoryStatus>,
    pub assignee: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub ai_insights: Option<Vec<String>>,
    pub is_vague: Option<bool>,
}

impl StoryUpdate {
    pub fn apply_to(self, story: &mut UserStory) {
        if let Some(title) = self.title {
            story.title = title;
        }
        if let Some(description) = self.description {
            story.description = description;
        }
        if let Some(points) = self.story_points {
            story.story_points = points;
        }
        if let Some(priority) = self.priority {
            story.priority = priority;
        }
        if let Some(risk_level) = self.risk_level {
            story.risk_level = risk_level;
        }
        if let Some(status) = self.status {
            story.status = status;
        }
        if let Some(assignee) = self.assignee {
            story.assignee = Some(assignee);
        }
        if let Some(dependencies) = self.dependencies {
            story.dependencies = dependencies;
        }
        if let Some(insights) = self.ai_insights {
            story.ai_insights = insights;
        }
        if let Some(is_vague) = self.is_vague {
            story.is_vague = is_vague;
        }
    }
}

// ============================================================================
// Team & Metrics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub role: String,
    /// Points per sprint
    pub capacity: u32,
    pub assigned_points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintMetrics {
    pub velocity: u32,
    pub capacity: u32,
    pub committed_points: u32,
    pub risk_score: u32,
    pub sprint_days: u32,
    pub remaining_days: u32,
}

/// One day of the risk burndown chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskDataPoint {
    pub day: u32,
    pub projected: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&StoryStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_draft_defaults() {
        let story = StoryDraft::default().into_story("story-x".to_string(), Utc::now());
        assert_eq!(story.title, "New Story");
        assert_eq!(story.description, "");
        assert_eq!(story.story_points, 3);
        assert_eq!(story.priority, Priority::Medium);
        assert_eq!(story.risk_level, RiskLevel::Low);
        assert_eq!(story.status, StoryStatus::Backlog);
        assert_eq!(story.ai_insights, vec!["Created from AI breakdown"]);
    }

    #[test]
    fn test_draft_points_capped() {
        let draft = StoryDraft {
            story_points: Some(u32::MAX),
            ..Default::default()
        };
        assert_eq!(draft.points_or_default(), draft_defaults::MAX_STORY_POINTS);
    }

    #[test]
    fn test_draft_zero_points_falls_back() {
        let draft = StoryDraft {
            story_points: Some(0),
            ..Default::default()
        };
        assert_eq!(draft.points_or_default(), 3);
    }

    #[test]
    fn test_story_update_only_touches_given_fields() {
        let mut story = StoryDraft {
            title: Some("Login".to_string()),
            story_points: Some(5),
            ..Default::default()
        }
        .into_story("story-1".to_string(), Utc::now());

        StoryUpdate {
            status: Some(StoryStatus::Done),
            ..Default::default()
        }
        .apply_to(&mut story);

        assert_eq!(story.status, StoryStatus::Done);
        assert_eq!(story.title, "Login");
        assert_eq!(story.story_points, 5);
    }

    #[test]
    fn test_user_story_camel_case() {
        let story = StoryDraft::default().into_story("s1".to_string(), Utc::now());
        let json = serde_json::to_value(&story).unwrap();
        assert!(json.get("storyPoints").is_some());
        assert!(json.get("riskLevel").is_some());
        assert!(json.get("isVague").is_some());
    }

    #[test]
    fn test_user_story_minimal_json() {
        let story: UserStory = serde_json::from_value(serde_json::json!({
            "id": "story-9",
            "title": "Audit logging",
            "storyPoints": 2
        }))
        .unwrap();
        assert_eq!(story.priority, Priority::Medium);
        assert_eq!(story.status, StoryStatus::Backlog);
        assert!(story.description.is_empty());
    }
}
