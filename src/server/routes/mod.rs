//! Command routing modules
//!
//! - backlog_routes: story CRUD, metrics, burndown, workload, dashboard
//! - chat_routes: copilot messages, sending, breakdown application

pub mod backlog_routes;
pub mod chat_routes;

use serde::Serialize;
use serde_json::Value;

use super::ServerAppState;

/// Extract a required argument from JSON args
pub fn get_arg<T: serde::de::DeserializeOwned>(args: &Value, name: &str) -> Result<T, String> {
    serde_json::from_value(
        args.get(name)
            .ok_or_else(|| format!("Missing argument: {}", name))?
            .clone(),
    )
    .map_err(|e| format!("Invalid argument {}: {}", name, e))
}

/// Extract an optional argument from JSON args
pub fn get_opt_arg<T: serde::de::DeserializeOwned>(
    args: &Value,
    name: &str,
) -> Result<Option<T>, String> {
    match args.get(name) {
        Some(v) if !v.is_null() => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| format!("Invalid argument {}: {}", name, e)),
        _ => Ok(None),
    }
}

/// Serialize a command result
pub fn to_value<T: Serialize>(result: T) -> Result<Value, String> {
    serde_json::to_value(result).map_err(|e| e.to_string())
}

/// Route a command to its implementation by dispatching to the appropriate sub-router
pub async fn route_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    if backlog_routes::is_backlog_command(cmd) {
        return backlog_routes::route_backlog_command(cmd, args, state);
    }

    if chat_routes::is_chat_command(cmd) {
        return chat_routes::route_chat_command(cmd, args, state).await;
    }

    Err(format!("Unknown command: {}", cmd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_arg() {
        let args = json!({"id": "story-1", "toIndex": 2});
        assert_eq!(get_arg::<String>(&args, "id").unwrap(), "story-1");
        assert_eq!(get_arg::<usize>(&args, "toIndex").unwrap(), 2);
        assert_eq!(
            get_arg::<String>(&args, "missing").unwrap_err(),
            "Missing argument: missing"
        );
        assert!(get_arg::<usize>(&args, "id")
            .unwrap_err()
            .starts_with("Invalid argument id"));
    }

    #[test]
    fn test_get_opt_arg() {
        let args = json!({"present": 1, "null": null});
        assert_eq!(get_opt_arg::<u32>(&args, "present").unwrap(), Some(1));
        assert_eq!(get_opt_arg::<u32>(&args, "null").unwrap(), None);
        assert_eq!(get_opt_arg::<u32>(&args, "absent").unwrap(), None);
    }
}
