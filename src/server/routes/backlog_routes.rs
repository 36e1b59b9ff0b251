//! Backlog and metrics command routing
//!
//! Handles: get_stories, add_story, remove_story, update_story, reorder_story,
//! get_metrics, get_risk_burndown, get_team_workload, get_dashboard

use crate::backlog::{metrics, seed, MemberWorkload};
use crate::models::{RiskDataPoint, SprintMetrics, StoryUpdate, UserStory};
use crate::utils::lock_mutex_recover;
use serde::Serialize;
use serde_json::Value;

use super::{get_arg, to_value, ServerAppState};

/// Everything the dashboard renders on load
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub sprint_name: &'static str,
    pub stories: Vec<UserStory>,
    pub metrics: SprintMetrics,
    pub capacity_utilization: f64,
    pub remaining_capacity: u32,
    pub risk_burndown: Vec<RiskDataPoint>,
    pub team_workload: Vec<MemberWorkload>,
    pub suggested_prompts: Vec<&'static str>,
}

/// Route backlog-related commands
pub fn route_backlog_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    let mut board = lock_mutex_recover(&state.board);

    match cmd {
        "get_stories" => to_value(board.stories()),

        "add_story" => {
            let story: UserStory = get_arg(&args, "story")?;
            board.add_story(story.clone()).map_err(|e| e.to_string())?;
            state.broadcaster.broadcast_board(&mut board);
            to_value(story)
        }

        "remove_story" => {
            let id: String = get_arg(&args, "id")?;
            let removed = board.remove_story(&id).map_err(|e| e.to_string())?;
            state.broadcaster.broadcast_board(&mut board);
            to_value(removed)
        }

        "update_story" => {
            let id: String = get_arg(&args, "id")?;
            let updates: StoryUpdate = get_arg(&args, "updates")?;
            let updated = board
                .update_story(&id, updates)
                .map_err(|e| e.to_string())?;
            state.broadcaster.broadcast_board(&mut board);
            to_value(updated)
        }

        "reorder_story" => {
            let id: String = get_arg(&args, "id")?;
            let to_index: usize = get_arg(&args, "toIndex")?;
            board
                .reorder_story(&id, to_index)
                .map_err(|e| e.to_string())?;
            state.broadcaster.broadcast_board(&mut board);
            Ok(Value::Null)
        }

        "get_metrics" => to_value(board.metrics()),

        "get_risk_burndown" => to_value(board.risk_burndown()),

        "get_team_workload" => to_value(board.team_workload()),

        "get_dashboard" => {
            let snapshot = board.snapshot();
            to_value(DashboardView {
                sprint_name: seed::SPRINT_NAME,
                capacity_utilization: metrics::capacity_utilization(&snapshot.metrics),
                remaining_capacity: metrics::remaining_capacity(&snapshot.metrics),
                stories: snapshot.stories,
                metrics: snapshot.metrics,
                risk_burndown: board.risk_burndown().to_vec(),
                team_workload: board.team_workload(),
                suggested_prompts: seed::SUGGESTED_PROMPTS.to_vec(),
            })
        }

        _ => Err(format!("Unknown backlog command: {}", cmd)),
    }
}

/// Check if a command is a backlog command
pub fn is_backlog_command(cmd: &str) -> bool {
    matches!(
        cmd,
        "get_stories"
            | "add_story"
            | "remove_story"
            | "update_story"
            | "reorder_story"
            | "get_metrics"
            | "get_risk_burndown"
            | "get_team_workload"
            | "get_dashboard"
    )
}
