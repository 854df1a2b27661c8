//! Client-side half of the session protocol
//!
//! `ChatClient` keeps a local mirror of the caller's session list and
//! per-session message arrays, guaranteeing the mirror never diverges from a
//! state the server has actually confirmed. Network calls are the only
//! suspension points; cache reads and writes are synchronous.

pub mod api;
pub mod cache;

pub use api::{ChatApi, ClientError};
pub use cache::SessionCache;

use uuid::Uuid;

use crate::domain::models::{ChatMessage, ChatRequest, ChatResponse, SessionSummary};

pub struct ChatClient {
    api: ChatApi,
    user_id: String,
    cache: SessionCache,
    active_session: Option<String>,
}

impl ChatClient {
    pub fn new(api: ChatApi, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            cache: SessionCache::new(),
            active_session: None,
        }
    }

    /// The session the next turn will append to, if any.
    pub fn active_session(&self) -> Option<&str> {
        self.active_session.as_deref()
    }

    /// Start composing in a fresh conversation; the next turn creates the
    /// session server-side.
    pub fn new_session(&mut self) {
        self.active_session = None;
    }

    /// The caller's session list: cached unless `force_refresh`, which
    /// refetches, replaces the mirror and reconciles the active session.
    pub async fn list_sessions(
        &mut self,
        force_refresh: bool,
    ) -> Result<Vec<SessionSummary>, ClientError> {
        if !force_refresh {
            if let Some(cached) = self.cache.sessions() {
                tracing::debug!("Using cached session list");
                return Ok(cached.to_vec());
            }
        }

        let sessions = self.api.get_sessions(&self.user_id).await?;
        self.cache.replace_sessions(sessions.clone());
        self.reconcile_active();
        Ok(sessions)
    }

    /// Message array for a session: cached once populated, fetched otherwise.
    /// Also makes the session the active one.
    pub async fn load_session_messages(
        &mut self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        if let Some(cached) = self.cache.messages(session_id) {
            tracing::debug!(session_id = %session_id, "Using cached messages");
            self.active_session = Some(session_id.to_string());
            return Ok(cached);
        }

        let session = self.api.get_session(&self.user_id, session_id).await?;
        self.cache.insert_messages(session_id, session.messages.clone());
        self.active_session = Some(session_id.to_string());
        Ok(session.messages)
    }

    /// Replace a session's message mirror with a fresh fetch. The only way
    /// an already-populated entry is invalidated.
    pub async fn reload_session_messages(
        &mut self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        let session = self.api.get_session(&self.user_id, session_id).await?;
        self.cache.insert_messages(session_id, session.messages.clone());
        self.active_session = Some(session_id.to_string());
        Ok(session.messages)
    }

    /// Submit one turn against the active session (or create one), mirror
    /// the confirmed pair locally, and refresh the session list to pick up
    /// the new or renamed entry.
    pub async fn send_message(
        &mut self,
        text: &str,
        include_history: bool,
    ) -> Result<ChatResponse, ClientError> {
        let request = ChatRequest {
            user_id: self.user_id.clone(),
            user_message: text.to_string(),
            session_id: self.active_session.clone(),
            include_history: Some(include_history),
            turn_key: Some(Uuid::new_v4().to_string()),
        };

        let reply = self.api.submit_turn(&request).await?;

        self.active_session = Some(reply.session_id.clone());
        self.cache.append_turn(
            &reply.session_id,
            ChatMessage::user(text),
            ChatMessage::assistant(reply.response.clone(), include_history),
        );

        // The turn itself succeeded; a failed list refresh leaves the stale
        // list in place until the next explicit refresh.
        if let Err(err) = self.list_sessions(true).await {
            tracing::warn!("Session list refresh after turn failed: {}", err);
        }

        Ok(reply)
    }

    /// Delete a session and evict it from both mirrors.
    pub async fn delete_session(&mut self, session_id: &str) -> Result<(), ClientError> {
        self.api.delete_session(&self.user_id, session_id).await?;

        self.cache.remove_session(session_id);
        if self.active_session.as_deref() == Some(session_id) {
            self.active_session = None;
        }
        Ok(())
    }

    /// An active session that vanished from a refreshed list (deleted from
    /// another client) means "no active session": the next turn creates one.
    fn reconcile_active(&mut self) {
        let Some(active) = &self.active_session else {
            return;
        };
        let known = self
            .cache
            .sessions()
            .is_some_and(|sessions| sessions.iter().any(|s| &s.session_id == active));
        if !known {
            tracing::info!(session_id = %active, "Active session no longer exists");
            self.active_session = None;
        }
    }
}
