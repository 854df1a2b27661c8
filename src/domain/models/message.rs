use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single message inside a session.
///
/// Messages are only ever created as half of a turn (user prompt or
/// assistant reply), never edited or deleted individually. Authorship is a
/// two-valued flag, not a subtype hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: String,
    pub text: String,
    pub is_user_message: bool,
    pub timestamp: DateTime<Utc>,
    /// On assistant replies: whether the turn was generated with the full
    /// prior conversation (as opposed to a single-turn completion).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_history: Option<bool>,
}

impl ChatMessage {
    /// Creates a user-authored message with a fresh identifier.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            text: text.into(),
            is_user_message: true,
            timestamp: Utc::now(),
            used_history: None,
        }
    }

    /// Creates an assistant reply with a fresh identifier.
    pub fn assistant(text: impl Into<String>, used_history: bool) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            text: text.into(),
            is_user_message: false,
            timestamp: Utc::now(),
            used_history: Some(used_history),
        }
    }
}
