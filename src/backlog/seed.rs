// Demo sprint: "User Onboarding"

use crate::models::{
    Priority, RiskDataPoint, RiskLevel, SprintMetrics, StoryStatus, TeamMember, UserStory,
};
use chrono::{DateTime, TimeZone, Utc};

pub const SPRINT_NAME: &str = "User Onboarding";

pub const GREETING: &str = "Hello! I'm SprintPilot, your AI planning assistant. I've analyzed your current backlog for the **User Onboarding** sprint. I notice a few items that might need attention - particularly the vague \"Improve UX\" story. How can I help you today?";

/// Prompts offered before the user has said anything
pub const SUGGESTED_PROMPTS: [&str; 3] = [
    "Review the 'Improve UX' story",
    "Am I overloaded?",
    "What are my biggest risks?",
];

fn created(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

#[allow(clippy::too_many_arguments)]
fn story(
    id: &str,
    title: &str,
    description: &str,
    story_points: u32,
    priority: Priority,
    risk_level: RiskLevel,
    status: StoryStatus,
    day: u32,
) -> UserStory {
    UserStory {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        story_points,
        priority,
        risk_level,
        status,
        assignee: None,
        dependencies: Vec::new(),
        ai_insights: Vec::new(),
        is_vague: false,
        created_at: created(day),
    }
}

pub fn initial_stories() -> Vec<UserStory> {
    vec![
        UserStory {
            assignee: Some("dev-1".to_string()),
            ..story(
                "story-1",
                "Design Login Page",
                "Create a modern, accessible login page with email/password and social auth options.",
                3,
                Priority::High,
                RiskLevel::Low,
                StoryStatus::Ready,
                10,
            )
        },
        UserStory {
            assignee: Some("dev-2".to_string()),
            dependencies: vec!["story-1".to_string()],
            ai_insights: vec![
                "Consider rate limiting".to_string(),
                "Add OAuth2 support".to_string(),
            ],
            ..story(
                "story-2",
                "Backend API for Authentication",
                "Implement secure authentication endpoints with JWT tokens, refresh logic, and session management.",
                5,
                Priority::High,
                RiskLevel::Medium,
                StoryStatus::Ready,
                10,
            )
        },
        UserStory {
            assignee: Some("dev-1".to_string()),
            dependencies: vec!["story-2".to_string()],
            ..story(
                "story-3",
                "User Registration Flow",
                "Build the complete registration flow including email verification and welcome sequence.",
                5,
                Priority::High,
                RiskLevel::Low,
                StoryStatus::Ready,
                11,
            )
        },
        story(
            "story-4",
            "Password Reset Functionality",
            "Implement secure password reset with email tokens and expiration handling.",
            3,
            Priority::Medium,
            RiskLevel::Low,
            StoryStatus::Backlog,
            11,
        ),
        UserStory {
            is_vague: true,
            ai_insights: vec![
                "Story is too vague - needs refinement".to_string(),
                "Consider breaking into smaller tasks".to_string(),
            ],
            ..story(
                "story-5",
                "Improve UX",
                "Make the user experience better.",
                8,
                Priority::Medium,
                RiskLevel::High,
                StoryStatus::Backlog,
                12,
            )
        },
        UserStory {
            dependencies: vec!["story-3".to_string()],
            ai_insights: vec!["Large story - consider splitting".to_string()],
            ..story(
                "story-6",
                "Onboarding Wizard",
                "Create a multi-step onboarding wizard to collect user preferences and setup their workspace.",
                8,
                Priority::Medium,
                RiskLevel::Medium,
                StoryStatus::Backlog,
                12,
            )
        },
        story(
            "story-7",
            "Profile Settings Page",
            "Allow users to update their profile information, avatar, and notification preferences.",
            5,
            Priority::Low,
            RiskLevel::Low,
            StoryStatus::Backlog,
            13,
        ),
    ]
}

pub fn team_members() -> Vec<TeamMember> {
    let member = |id: &str, name: &str, avatar: &str, role: &str, capacity, assigned| TeamMember {
        id: id.to_string(),
        name: name.to_string(),
        avatar: avatar.to_string(),
        role: role.to_string(),
        capacity,
        assigned_points: assigned,
    };

    vec![
        member("dev-1", "Alex Chen", "AC", "Frontend Developer", 15, 8),
        member("dev-2", "Jordan Smith", "JS", "Backend Developer", 15, 5),
        member("dev-3", "Sam Taylor", "ST", "Full Stack Developer", 10, 0),
    ]
}

pub fn sprint_metrics() -> SprintMetrics {
    SprintMetrics {
        velocity: 40,
        capacity: 40,
        committed_points: 37,
        risk_score: 35,
        sprint_days: 14,
        remaining_days: 10,
    }
}

pub fn risk_burndown() -> Vec<RiskDataPoint> {
    const PROJECTED: [f64; 14] = [
        100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 35.0, 25.0, 20.0, 15.0, 10.0, 5.0, 0.0,
    ];
    const ACTUAL: [f64; 4] = [100.0, 92.0, 85.0, 75.0];

    PROJECTED
        .iter()
        .enumerate()
        .map(|(idx, &projected)| RiskDataPoint {
            day: idx as u32 + 1,
            projected,
            actual: ACTUAL.get(idx).copied(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_shape() {
        assert_eq!(initial_stories().len(), 7);
        assert_eq!(team_members().len(), 3);

        let burndown = risk_burndown();
        assert_eq!(burndown.len(), 14);
        assert_eq!(burndown[0].day, 1);
        assert_eq!(burndown[3].actual, Some(75.0));
        assert_eq!(burndown[4].actual, None);
    }

    #[test]
    fn test_only_improve_ux_is_vague() {
        let vague: Vec<_> = initial_stories()
            .into_iter()
            .filter(|s| s.is_vague)
            .map(|s| s.id)
            .collect();
        assert_eq!(vague, vec!["story-5"]);
    }
}
