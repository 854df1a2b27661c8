//! In-memory session store
//!
//! Backs tests and database-free development runs. Honors the same
//! version-checked write contract as the SurrealDB store.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::store::SessionStore;
use crate::domain::models::ChatSession;
use crate::shared::{ChatError, Result};

type Key = (String, String);

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<Key, ChatSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(user_id: &str, session_id: &str) -> Key {
        (user_id.to_string(), session_id.to_string())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn upsert(&self, session: &ChatSession, expected_version: Option<u64>) -> Result<()> {
        let key = Self::key(&session.user_id, &session.session_id);
        match (self.sessions.entry(key), expected_version) {
            (Entry::Vacant(slot), None) => {
                slot.insert(session.clone());
                Ok(())
            }
            (Entry::Occupied(mut slot), Some(expected)) if slot.get().version == expected => {
                slot.insert(session.clone());
                Ok(())
            }
            // Existing key on create, stale version, or deleted out from
            // under an in-flight turn.
            _ => Err(ChatError::Conflict(session.session_id.clone())),
        }
    }

    async fn get(&self, user_id: &str, session_id: &str) -> Result<Option<ChatSession>> {
        Ok(self
            .sessions
            .get(&Self::key(user_id, session_id))
            .map(|entry| entry.clone()))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ChatSession>> {
        Ok(self
            .sessions
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn delete(&self, user_id: &str, session_id: &str) -> Result<bool> {
        Ok(self.sessions.remove(&Self::key(user_id, session_id)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_read_back() {
        let store = MemorySessionStore::new();
        let session = ChatSession::new("u1");
        store.upsert(&session, None).await.unwrap();

        let loaded = store.get("u1", &session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_create_conflicts_on_existing_key() {
        let store = MemorySessionStore::new();
        let session = ChatSession::new("u1");
        store.upsert(&session, None).await.unwrap();

        let err = store.upsert(&session, None).await.unwrap_err();
        assert!(matches!(err, ChatError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let store = MemorySessionStore::new();
        let mut session = ChatSession::new("u1");
        store.upsert(&session, None).await.unwrap();

        session.version = 1;
        store.upsert(&session, Some(0)).await.unwrap();

        // A writer still holding version 0 must not clobber version 1.
        let mut stale = session.clone();
        stale.version = 1;
        let err = store.upsert(&stale, Some(0)).await.unwrap_err();
        assert!(matches!(err, ChatError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_is_partitioned_by_owner() {
        let store = MemorySessionStore::new();
        store.upsert(&ChatSession::new("u1"), None).await.unwrap();
        store.upsert(&ChatSession::new("u1"), None).await.unwrap();
        store.upsert(&ChatSession::new("u2"), None).await.unwrap();

        assert_eq!(store.list_for_user("u1").await.unwrap().len(), 2);
        assert_eq!(store.list_for_user("u2").await.unwrap().len(), 1);
        assert!(store.list_for_user("u3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = MemorySessionStore::new();
        let session = ChatSession::new("u1");
        store.upsert(&session, None).await.unwrap();

        assert!(store.delete("u1", &session.session_id).await.unwrap());
        assert!(!store.delete("u1", &session.session_id).await.unwrap());
        assert!(store.get("u1", &session.session_id).await.unwrap().is_none());
    }
}
