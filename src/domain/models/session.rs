use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::ChatMessage;

/// Display name used when derivation from the first user message yields nothing.
pub const DEFAULT_SESSION_NAME: &str = "Default Session";

/// Receipt for a completed turn, keyed by the client-supplied idempotency key.
///
/// A retried submission carrying a known key resolves to the stored reply
/// instead of invoking the provider again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReceipt {
    pub turn_key: String,
    pub assistant_message_id: String,
}

/// An owner-partitioned conversation document.
///
/// The message sequence is append-only and always grows in user/assistant
/// pairs; the owner and identifier are immutable after creation. `version`
/// guards upserts against concurrent lost updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    #[serde(rename = "id")]
    pub session_id: String,
    pub user_id: String,
    pub session_name: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub turns: Vec<TurnReceipt>,
}

/// Lightweight session entry for listings (no message bodies).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub session_name: String,
    pub message_count: usize,
    pub last_updated: DateTime<Utc>,
}

impl ChatSession {
    /// Creates an empty session for `user_id` with a fresh unique identifier.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            session_name: DEFAULT_SESSION_NAME.to_string(),
            messages: Vec::new(),
            last_updated: Utc::now(),
            version: 0,
            turns: Vec::new(),
        }
    }

    /// Derives a display name from the first user message: the first two
    /// words, with `…` appended when the message had more.
    pub fn derive_name(first_user_message: &str) -> String {
        let words: Vec<&str> = first_user_message.split_whitespace().collect();
        if words.is_empty() {
            return DEFAULT_SESSION_NAME.to_string();
        }
        let mut name = words[..words.len().min(2)].join(" ");
        if words.len() > 2 {
            name.push('…');
        }
        name
    }

    /// Looks up the assistant reply recorded for an idempotency key.
    pub fn replay_for_key(&self, turn_key: &str) -> Option<&ChatMessage> {
        let receipt = self.turns.iter().find(|t| t.turn_key == turn_key)?;
        self.messages
            .iter()
            .find(|m| m.message_id == receipt.assistant_message_id)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            session_name: self.session_name.clone(),
            message_count: self.messages.len(),
            last_updated: self.last_updated,
        }
    }
}
