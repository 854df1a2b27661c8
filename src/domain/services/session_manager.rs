//! Session manager
//!
//! Owns the conversation data model and the rules for creating vs. appending
//! to a session. Every turn appends exactly one user/assistant pair; a
//! session never ends mid-pair. The completion provider and the session
//! store are external collaborators behind traits.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::models::{ChatMessage, ChatSession, SessionSummary, TurnReceipt};
use crate::infrastructure::database::SessionStore;
use crate::provider::CompletionProvider;
use crate::shared::{ChatError, Result};

/// Result of one submitted chat turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub session_id: String,
    pub response: String,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn CompletionProvider>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { store, provider }
    }

    /// Submit one chat turn.
    ///
    /// Without `session_id` a new session is created; with one, the existing
    /// session is loaded and appended to. The provider is called before
    /// anything is written, so a provider failure leaves no partial state.
    pub async fn submit_turn(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        user_message: &str,
        include_history: bool,
        turn_key: Option<&str>,
    ) -> Result<TurnOutcome> {
        if user_id.trim().is_empty() {
            return Err(ChatError::Validation("userId is required".to_string()));
        }
        if user_message.trim().is_empty() {
            return Err(ChatError::Validation("userMessage is required".to_string()));
        }

        let (mut session, is_new) = match session_id {
            Some(id) => {
                let session = self
                    .store
                    .get(user_id, id)
                    .await?
                    .ok_or_else(|| ChatError::SessionNotFound(id.to_string()))?;
                (session, false)
            }
            None => (ChatSession::new(user_id), true),
        };

        // Retried turn: hand back the stored reply, touch nothing.
        if let Some(key) = turn_key {
            if let Some(reply) = session.replay_for_key(key) {
                let response = reply.text.clone();
                tracing::info!(
                    session_id = %session.session_id,
                    turn_key = %key,
                    "Returning stored reply for replayed turn"
                );
                return Ok(TurnOutcome {
                    session_id: session.session_id,
                    response,
                });
            }
        }

        let user_msg = ChatMessage::user(user_message);
        let with_history = include_history && !session.messages.is_empty();
        let reply_text = if with_history {
            let mut history = session.messages.clone();
            history.push(user_msg.clone());
            self.generate(&history).await?
        } else {
            self.generate(std::slice::from_ref(&user_msg)).await?
        };

        let assistant_msg = ChatMessage::assistant(reply_text, with_history);
        let response = assistant_msg.text.clone();

        if is_new {
            session.session_name = ChatSession::derive_name(user_message);
        }
        if let Some(key) = turn_key {
            session.turns.push(TurnReceipt {
                turn_key: key.to_string(),
                assistant_message_id: assistant_msg.message_id.clone(),
            });
        }
        session.messages.push(user_msg);
        session.messages.push(assistant_msg);
        session.last_updated = Utc::now();

        let expected = if is_new { None } else { Some(session.version) };
        session.version += 1;
        self.store.upsert(&session, expected).await?;

        tracing::info!(
            user_id = %session.user_id,
            session_id = %session.session_id,
            message_count = session.messages.len(),
            new_session = is_new,
            "Turn persisted"
        );

        Ok(TurnOutcome {
            session_id: session.session_id,
            response,
        })
    }

    async fn generate(&self, history: &[ChatMessage]) -> Result<String> {
        self.provider
            .complete(history)
            .await
            .map_err(|e| ChatError::Provider(e.to_string()))
    }

    /// Every session owned by `user_id`, most recently updated first.
    pub async fn get_history(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        if user_id.trim().is_empty() {
            return Err(ChatError::Validation("userId is required".to_string()));
        }
        let mut sessions = self.store.list_for_user(user_id).await?;
        sessions.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(sessions.iter().map(|s| s.summary()).collect())
    }

    pub async fn get_session(&self, user_id: &str, session_id: &str) -> Result<ChatSession> {
        self.store
            .get(user_id, session_id)
            .await?
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))
    }

    /// Irreversibly remove a session.
    pub async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<()> {
        if !self.store.delete(user_id, session_id).await? {
            return Err(ChatError::SessionNotFound(session_id.to_string()));
        }
        tracing::info!(user_id = %user_id, session_id = %session_id, "Session deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::infrastructure::database::MemorySessionStore;
    use crate::provider::CompletionError;

    /// Provider stub: replies with a canned prefix plus the history length,
    /// and records every history it was handed.
    #[derive(Default)]
    struct StubProvider {
        fail: bool,
        calls: AtomicUsize,
        seen_histories: Mutex<Vec<usize>>,
    }

    impl StubProvider {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for StubProvider {
        async fn complete(&self, history: &[ChatMessage]) -> std::result::Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CompletionError::EmptyCompletion);
            }
            self.seen_histories
                .lock()
                .unwrap()
                .push(history.len());
            Ok(format!("reply-{}", self.calls.load(Ordering::SeqCst)))
        }
    }

    fn manager() -> (SessionManager, Arc<MemorySessionStore>, Arc<StubProvider>) {
        let store = Arc::new(MemorySessionStore::new());
        let provider = Arc::new(StubProvider::default());
        (
            SessionManager::new(store.clone(), provider.clone()),
            store,
            provider,
        )
    }

    #[tokio::test]
    async fn test_first_turn_creates_session_with_one_pair() {
        let (manager, store, _) = manager();

        let outcome = manager
            .submit_turn("u1", None, "Hello", false, None)
            .await
            .unwrap();

        let session = store.get("u1", &outcome.session_id).await.unwrap().unwrap();
        assert_eq!(session.messages.len(), 2);
        assert!(session.messages[0].is_user_message);
        assert_eq!(session.messages[0].text, "Hello");
        assert!(!session.messages[1].is_user_message);
        assert_eq!(session.messages[1].text, outcome.response);
    }

    #[tokio::test]
    async fn test_follow_up_appends_and_preserves_prefix() {
        let (manager, _, _) = manager();

        let first = manager
            .submit_turn("u1", None, "Hello", false, None)
            .await
            .unwrap();
        let before = manager.get_session("u1", &first.session_id).await.unwrap();

        let second = manager
            .submit_turn(
                "u1",
                Some(&first.session_id),
                "More detail please",
                false,
                None,
            )
            .await
            .unwrap();
        assert_eq!(second.session_id, first.session_id);

        let after = manager.get_session("u1", &first.session_id).await.unwrap();
        assert_eq!(after.messages.len(), 4);
        assert_eq!(&after.messages[..2], &before.messages[..]);
        assert_eq!(after.messages[2].text, "More detail please");
        assert!(after.messages[2].is_user_message);
        assert!(!after.messages[3].is_user_message);
        assert_eq!(after.messages[3].text, second.response);
    }

    #[tokio::test]
    async fn test_unknown_session_id_is_not_found() {
        let (manager, _, provider) = manager();
        let err = manager
            .submit_turn("u1", Some("missing"), "Hello", false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_fields() {
        let (manager, _, _) = manager();
        assert!(matches!(
            manager.submit_turn("", None, "Hello", false, None).await,
            Err(ChatError::Validation(_))
        ));
        assert!(matches!(
            manager.submit_turn("u1", None, "  ", false, None).await,
            Err(ChatError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_without_writes() {
        let store = Arc::new(MemorySessionStore::new());
        let provider = Arc::new(StubProvider::failing());
        let manager = SessionManager::new(store.clone(), provider);

        let err = manager
            .submit_turn("u1", None, "Hello", false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Provider(_)));
        assert!(store.list_for_user("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_flag_controls_provider_input() {
        let (manager, _, provider) = manager();

        let first = manager
            .submit_turn("u1", None, "Hello", true, None)
            .await
            .unwrap();
        // New session: no prior messages, single-turn completion.
        assert_eq!(provider.seen_histories.lock().unwrap()[0], 1);

        manager
            .submit_turn("u1", Some(&first.session_id), "Again", true, None)
            .await
            .unwrap();
        // 2 prior messages + the new one.
        assert_eq!(provider.seen_histories.lock().unwrap()[1], 3);

        manager
            .submit_turn("u1", Some(&first.session_id), "Once more", false, None)
            .await
            .unwrap();
        assert_eq!(provider.seen_histories.lock().unwrap()[2], 1);

        let session = manager.get_session("u1", &first.session_id).await.unwrap();
        assert_eq!(session.messages[1].used_history, Some(false));
        assert_eq!(session.messages[3].used_history, Some(true));
        assert_eq!(session.messages[5].used_history, Some(false));
    }

    #[tokio::test]
    async fn test_first_turn_derives_session_name() {
        let (manager, _, _) = manager();

        let outcome = manager
            .submit_turn("u1", None, "I need help with my account", false, None)
            .await
            .unwrap();
        let session = manager.get_session("u1", &outcome.session_id).await.unwrap();
        assert_eq!(session.session_name, "I need…");

        let outcome = manager
            .submit_turn("u1", None, "Hi", false, None)
            .await
            .unwrap();
        let session = manager.get_session("u1", &outcome.session_id).await.unwrap();
        assert_eq!(session.session_name, "Hi");
    }

    #[tokio::test]
    async fn test_name_is_not_rederived_on_later_turns() {
        let (manager, _, _) = manager();
        let first = manager
            .submit_turn("u1", None, "Hello there friend", false, None)
            .await
            .unwrap();
        manager
            .submit_turn("u1", Some(&first.session_id), "Different words now", false, None)
            .await
            .unwrap();

        let session = manager.get_session("u1", &first.session_id).await.unwrap();
        assert_eq!(session.session_name, "Hello there…");
    }

    #[tokio::test]
    async fn test_replayed_turn_key_returns_stored_reply() {
        let (manager, _, provider) = manager();

        let first = manager
            .submit_turn("u1", None, "Hello", false, Some("key-1"))
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let replay = manager
            .submit_turn("u1", Some(&first.session_id), "Hello", false, Some("key-1"))
            .await
            .unwrap();
        assert_eq!(replay.response, first.response);
        assert_eq!(replay.session_id, first.session_id);
        // No second provider call, no extra messages.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let session = manager.get_session("u1", &first.session_id).await.unwrap();
        assert_eq!(session.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_get_history_lists_own_sessions_most_recent_first() {
        let (manager, _, _) = manager();

        let first = manager
            .submit_turn("u1", None, "First session here", false, None)
            .await
            .unwrap();
        let second = manager
            .submit_turn("u1", None, "Second one", false, None)
            .await
            .unwrap();
        manager.submit_turn("u2", None, "Other owner", false, None)
            .await
            .unwrap();

        let history = manager.get_history("u1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].session_id, second.session_id);
        assert_eq!(history[1].session_id, first.session_id);
        assert_eq!(history[0].message_count, 2);
    }

    #[tokio::test]
    async fn test_delete_is_terminal() {
        let (manager, _, _) = manager();
        let outcome = manager
            .submit_turn("u1", None, "Hello", false, None)
            .await
            .unwrap();

        manager.delete_session("u1", &outcome.session_id).await.unwrap();

        assert!(matches!(
            manager.get_session("u1", &outcome.session_id).await,
            Err(ChatError::SessionNotFound(_))
        ));
        assert!(manager.get_history("u1").await.unwrap().is_empty());
        assert!(matches!(
            manager.delete_session("u1", &outcome.session_id).await,
            Err(ChatError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sessions_are_owner_scoped() {
        let (manager, _, _) = manager();
        let outcome = manager
            .submit_turn("u1", None, "Hello", false, None)
            .await
            .unwrap();

        // Another owner never sees u1's session.
        assert!(matches!(
            manager.get_session("u2", &outcome.session_id).await,
            Err(ChatError::SessionNotFound(_))
        ));
        assert!(matches!(
            manager
                .submit_turn("u2", Some(&outcome.session_id), "Hi", false, None)
                .await,
            Err(ChatError::SessionNotFound(_))
        ));
    }
}
