// src/types.rs

//! Shared data types for the per-project record and the tool result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a conversation entry.
///
/// Stored as a plain string. Roles written by other tools are kept as
/// `Other` so a record never fails to load because of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(other) => other,
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// A single message in the stored conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub is_current: bool,
}

impl ConversationEntry {
    /// Fresh entry with a random id and the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            role,
            content: content.into(),
            is_current: false,
        }
    }
}

/// Per-project record persisted next to the project sources.
///
/// Missing fields default to empty/false so older or hand-edited files
/// still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub run_command: String,
    #[serde(default)]
    pub execute_automatically: bool,
    #[serde(default)]
    pub command_section_visible: bool,
    #[serde(default)]
    pub conversation_history: Vec<ConversationEntry>,
}

impl ProjectConfig {
    /// The command to run automatically, if one is configured and enabled.
    pub fn auto_command(&self) -> Option<&str> {
        let cmd = self.run_command.trim();
        (self.execute_automatically && !cmd.is_empty()).then_some(cmd)
    }
}

/// What the tool call returns, serialized as pretty JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub command_logs: String,
    pub interactive_feedback: String,
    pub conversation_history: Vec<ConversationEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_config_round_trips_through_json() {
        let config = ProjectConfig {
            run_command: "npm run dev".into(),
            execute_automatically: true,
            command_section_visible: false,
            conversation_history: vec![ConversationEntry::new(Role::User, "Test message")],
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"run_command\":\"npm run dev\""));
        assert!(json.contains("\"role\":\"user\""));

        let decoded: ProjectConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let decoded: ProjectConfig = serde_json::from_str(r#"{"run_command":"make"}"#).unwrap();
        assert_eq!(decoded.run_command, "make");
        assert!(!decoded.execute_automatically);
        assert!(decoded.conversation_history.is_empty());
    }

    #[test]
    fn auto_command_requires_flag_and_command() {
        let mut config = ProjectConfig {
            run_command: "  cargo test ".into(),
            ..ProjectConfig::default()
        };
        assert_eq!(config.auto_command(), None);
        config.execute_automatically = true;
        assert_eq!(config.auto_command(), Some("cargo test"));
        config.run_command = "   ".into();
        assert_eq!(config.auto_command(), None);
    }

    #[test]
    fn unknown_roles_survive_a_round_trip() {
        let raw = r#"{
            "run_command": "make",
            "conversation_history": [
                {"id": "1", "timestamp": "2025-01-01T00:00:00Z", "role": "system", "content": "hi"},
                {"id": "2", "timestamp": "2025-01-01T00:00:01Z",
                 "role": "assistant", "content": "ok"}
            ]
        }"#;

        let decoded: ProjectConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.conversation_history[0].role, Role::Other("system".into()));
        assert_eq!(decoded.conversation_history[1].role, Role::Assistant);

        let json = serde_json::to_string(&decoded).unwrap();
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"role\":\"assistant\""));
    }

    #[test]
    fn entries_get_distinct_ids() {
        let a = ConversationEntry::new(Role::Assistant, "x");
        let b = ConversationEntry::new(Role::Assistant, "x");
        assert_ne!(a.id, b.id);
        assert!(!a.is_current);
    }
}
