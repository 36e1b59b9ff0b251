// Data models matching the dashboard's TypeScript types

pub mod chat;
pub mod copilot;
pub mod story;

pub use chat::{
    new_message_id, ActionKind, ChatAction, ChatMessage, MessageRole, GREETING_MESSAGE_ID,
    PROVISIONAL_ID_PREFIX,
};
pub use copilot::{CopilotRequest, MetricsContext, StoryContext};
pub use story::{
    draft_defaults, Priority, RiskDataPoint, RiskLevel, SprintMetrics, StoryDraft, StoryStatus,
    StoryUpdate, TeamMember, UserStory,
};
