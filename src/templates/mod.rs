// Template system for prompt generation

pub mod builtin;

use crate::models::CopilotRequest;
use anyhow::{anyhow, Result};
use tera::{Context, Tera};

/// Render the copilot system prompt for one request
pub fn render_copilot_system_prompt(request: &CopilotRequest) -> Result<String> {
    let context = Context::from_serialize(request)
        .map_err(|e| anyhow!("Failed to build template context: {}", e))?;

    Tera::one_off(builtin::COPILOT_SYSTEM_TEMPLATE, &context, false).map_err(|e| {
        anyhow!(
            "Failed to render template '{}': {}",
            builtin::COPILOT_SYSTEM,
            e
        )
    })
}
