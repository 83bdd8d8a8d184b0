// Fixed prompt fragments for the composer. Per-agent text (base prompt,
// artifacts, code, sheet and update-document templates) lives in the data
// files; only the scaffolding that wraps it is defined here.

/// Marker in the default base prompt that is replaced by the agent's name.
pub const NAME_MARKER: &str = "You are ,";

/// Agent name used when no referral record is resolved.
pub const DEFAULT_AGENT_NAME: &str = "Gluks";

/// The chat model that receives no artifacts block.
pub const REASONING_MODEL: &str = "chat-model-reasoning";

pub const DEFAULT_CHAT_MODEL: &str = "chat-model";

/// Rendered for any agent field that is missing or empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// Rendered for any geographic hint the request did not carry.
pub const UNKNOWN_HINT: &str = "unknown";

/// Header line of the agent data block. The model must not answer beyond it.
pub const AGENT_DATA_HEADER: &str = "⚠️ USE ONLY THE FOLLOWING DATA WHEN ANSWERING USER:";

pub const REQUEST_ORIGIN_HEADER: &str = "About the origin of user's request:";
