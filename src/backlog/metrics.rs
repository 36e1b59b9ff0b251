// Sprint metric formulas
//
// Linear formulas: committed points, a weighted risk
// score, a straight-line risk burndown and per-member load levels.

use crate::models::{RiskDataPoint, RiskLevel, SprintMetrics, StoryStatus, TeamMember, UserStory};
use serde::{Deserialize, Serialize};

/// Risk added per high-risk story
pub const HIGH_RISK_WEIGHT: u32 = 15;
/// Risk added per story flagged as needing refinement
pub const VAGUE_STORY_WEIGHT: u32 = 20;
/// Risk added when committed points exceed capacity
pub const OVER_CAPACITY_PENALTY: u32 = 25;
pub const MAX_RISK_SCORE: u32 = 100;
/// Number of days the burndown projection spreads the risk over
pub const BURNDOWN_DAYS: f64 = 14.0;

/// Sum of points over stories that are not done
pub fn committed_points(stories: &[UserStory]) -> u32 {
    stories
        .iter()
        .filter(|s| s.status != StoryStatus::Done)
        .fold(0u32, |total, s| total.saturating_add(s.story_points))
}

pub fn risk_score(stories: &[UserStory], committed: u32, capacity: u32) -> u32 {
    let high_risk = stories
        .iter()
        .filter(|s| s.risk_level == RiskLevel::High)
        .count() as u32;
    let vague = stories.iter().filter(|s| s.is_vague).count() as u32;
    let over_capacity = if committed > capacity {
        OVER_CAPACITY_PENALTY
    } else {
        0
    };

    high_risk
        .saturating_mul(HIGH_RISK_WEIGHT)
        .saturating_add(vague.saturating_mul(VAGUE_STORY_WEIGHT))
        .saturating_add(over_capacity)
        .min(MAX_RISK_SCORE)
}

/// Recompute committed points and risk score, keeping the rest of `previous`
pub fn recalculate(stories: &[UserStory], previous: &SprintMetrics) -> SprintMetrics {
    let committed = committed_points(stories);
    SprintMetrics {
        committed_points: committed,
        risk_score: risk_score(stories, committed, previous.capacity),
        ..*previous
    }
}

/// Re-project the burndown from `risk_score`, preserving recorded actuals
pub fn project_burndown(baseline: &[RiskDataPoint], risk_score: u32) -> Vec<RiskDataPoint> {
    let score = f64::from(risk_score);
    baseline
        .iter()
        .enumerate()
        .map(|(idx, point)| RiskDataPoint {
            projected: (score - (score / BURNDOWN_DAYS) * idx as f64).max(0.0),
            ..*point
        })
        .collect()
}

/// Committed points as a percentage of capacity, capped at 120
pub fn capacity_utilization(metrics: &SprintMetrics) -> f64 {
    if metrics.capacity == 0 {
        return 0.0;
    }
    (f64::from(metrics.committed_points) / f64::from(metrics.capacity) * 100.0).min(120.0)
}

pub fn remaining_capacity(metrics: &SprintMetrics) -> u32 {
    metrics.capacity.saturating_sub(metrics.committed_points)
}

// ============================================================================
// Team workload
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadLevel {
    Light,
    Moderate,
    High,
    Overloaded,
}

impl LoadLevel {
    fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.0 {
            LoadLevel::Overloaded
        } else if ratio > 0.8 {
            LoadLevel::High
        } else if ratio > 0.5 {
            LoadLevel::Moderate
        } else {
            LoadLevel::Light
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberWorkload {
    pub member_id: String,
    pub name: String,
    pub assigned_points: u32,
    pub capacity: u32,
    /// Load percentage, capped at 100 for display
    pub load_percentage: f64,
    pub is_overloaded: bool,
    pub level: LoadLevel,
}

pub fn team_workload(members: &[TeamMember]) -> Vec<MemberWorkload> {
    members
        .iter()
        .map(|member| {
            let ratio = if member.capacity == 0 {
                if member.assigned_points > 0 {
                    f64::INFINITY
                } else {
                    0.0
                }
            } else {
                f64::from(member.assigned_points) / f64::from(member.capacity)
            };

            MemberWorkload {
                member_id: member.id.clone(),
                name: member.name.clone(),
                assigned_points: member.assigned_points,
                capacity: member.capacity,
                load_percentage: (ratio * 100.0).min(100.0),
                is_overloaded: member.assigned_points > member.capacity,
                level: LoadLevel::from_ratio(ratio),
            }
        })
        .collect()
}
