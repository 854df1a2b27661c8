use serde::{Deserialize, Serialize};

/// Chat turn request payload (shared between handlers and the client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: String,
    /// Message/prompt to send
    pub user_message: String,
    /// Session to append to; absent on the turn that creates one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Send the full prior conversation to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_history: Option<bool>,
    /// Client idempotency key; a retried submission with the same key
    /// returns the previously stored reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    /// The caller must remember this for subsequent turns
    pub session_id: String,
}

/// Response for delete operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSessionResponse {
    pub success: bool,
    pub message: String,
    pub session_id: String,
}
