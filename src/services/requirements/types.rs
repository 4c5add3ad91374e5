//! Requirements Conversation Types
//!
//! Turn inputs and outputs exchanged with the caller, plus the tolerant view
//! of a decoded backend reply.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Speaker of one history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    User,
    Assistant,
}

impl ConversationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Label used when the transcript is rendered into a prompt
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// One prior message of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: ConversationRole,
    pub content: String,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::Assistant,
            content: content.into(),
        }
    }
}

/// Result of one conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Text shown to the user; never empty
    pub reply: String,
    /// Updates restricted to fields the schema defines
    pub updated_fields: Map<String, Value>,
    /// Whether another turn is expected
    pub needs_more: bool,
}

/// Fields the backend is instructed to return.
///
/// Built leniently from whatever structure the sanitizer produced: anything
/// missing or of the wrong kind is treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendReply {
    pub updated_fields: Map<String, Value>,
    pub reply: Option<String>,
    pub follow_up_question: Option<String>,
}

impl BackendReply {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let updated_fields = obj
            .get("updated_fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Self {
            updated_fields,
            reply: non_empty_string(obj.get("reply")),
            follow_up_question: non_empty_string(obj.get("follow_up_question")),
        }
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
