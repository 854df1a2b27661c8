//! Client-local mirror of server-confirmed session state
//!
//! Write-through cache with no expiry: entries go stale only when a mutating
//! operation invalidates them through the explicit calls below.

use dashmap::DashMap;

use crate::domain::models::{ChatMessage, SessionSummary};

#[derive(Default)]
pub struct SessionCache {
    /// Session list; `None` until the first successful fetch.
    sessions: Option<Vec<SessionSummary>>,
    /// Message arrays by session id.
    messages: DashMap<String, Vec<ChatMessage>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> Option<&[SessionSummary]> {
        self.sessions.as_deref()
    }

    /// Replace the session list with a freshly fetched one.
    pub fn replace_sessions(&mut self, sessions: Vec<SessionSummary>) {
        self.sessions = Some(sessions);
    }

    pub fn messages(&self, session_id: &str) -> Option<Vec<ChatMessage>> {
        self.messages.get(session_id).map(|entry| entry.clone())
    }

    /// Populate the message mirror for a session from a full reload.
    pub fn insert_messages(&self, session_id: &str, messages: Vec<ChatMessage>) {
        self.messages.insert(session_id.to_string(), messages);
    }

    /// Append one confirmed turn to the mirror. The only partial patch the
    /// mirror ever receives; everything else is a full reload.
    pub fn append_turn(&self, session_id: &str, user: ChatMessage, assistant: ChatMessage) {
        let mut entry = self.messages.entry(session_id.to_string()).or_default();
        entry.push(user);
        entry.push(assistant);
    }

    /// Drop a deleted session from both mirrors.
    pub fn remove_session(&mut self, session_id: &str) {
        self.messages.remove(session_id);
        if let Some(sessions) = &mut self.sessions {
            sessions.retain(|s| s.session_id != session_id);
        }
    }
}
