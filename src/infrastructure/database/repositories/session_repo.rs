//! SurrealDB-backed session store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use super::super::connection::Database;
use super::super::store::SessionStore;
use crate::domain::models::{ChatMessage, ChatSession, TurnReceipt};
use crate::shared::{ChatError, Result};

/// Session document as stored. The record id is SurrealDB's own; the
/// session's public identifier lives in `session_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    id: Option<Thing>,
    session_id: String,
    user_id: String,
    session_name: String,
    messages: Vec<ChatMessage>,
    last_updated: DateTime<Utc>,
    version: u64,
    #[serde(default)]
    turns: Vec<TurnReceipt>,
}

impl From<&ChatSession> for SessionRecord {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: None,
            session_id: session.session_id.clone(),
            user_id: session.user_id.clone(),
            session_name: session.session_name.clone(),
            messages: session.messages.clone(),
            last_updated: session.last_updated,
            version: session.version,
            turns: session.turns.clone(),
        }
    }
}

impl From<SessionRecord> for ChatSession {
    fn from(record: SessionRecord) -> Self {
        Self {
            session_id: record.session_id,
            user_id: record.user_id,
            session_name: record.session_name,
            messages: record.messages,
            last_updated: record.last_updated,
            version: record.version,
            turns: record.turns,
        }
    }
}

/// Session store backed by the embedded SurrealDB instance
pub struct SurrealSessionStore {
    db: Database,
}

impl SurrealSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for SurrealSessionStore {
    async fn upsert(&self, session: &ChatSession, expected_version: Option<u64>) -> Result<()> {
        let record = SessionRecord::from(session);

        let Some(expected) = expected_version else {
            // Creation: the unique (user_id, session_id) index rejects an
            // existing key.
            let created: Option<SessionRecord> = self
                .db
                .create("session")
                .content(record)
                .await
                .map_err(|e| {
                    if e.to_string().contains("idx_session_key") {
                        ChatError::Conflict(session.session_id.clone())
                    } else {
                        ChatError::Storage(format!("Failed to create session: {e}"))
                    }
                })?;

            return created
                .map(|_| ())
                .ok_or_else(|| ChatError::Storage("Failed to create session".to_string()));
        };

        let updated: Option<SessionRecord> = self
            .db
            .query(
                r#"
                UPDATE session SET
                    session_name = $session_name,
                    messages = $messages,
                    last_updated = $last_updated,
                    version = $version,
                    turns = $turns
                WHERE session_id = $session_id AND user_id = $user_id AND version = $expected
                RETURN AFTER
            "#,
            )
            .bind(("session_name", record.session_name))
            .bind(("messages", record.messages))
            .bind(("last_updated", record.last_updated))
            .bind(("version", record.version))
            .bind(("turns", record.turns))
            .bind(("session_id", record.session_id))
            .bind(("user_id", record.user_id))
            .bind(("expected", expected))
            .await
            .map_err(|e| ChatError::Storage(format!("Failed to update session: {e}")))?
            .take(0)
            .map_err(|e| ChatError::Storage(format!("Failed to get update result: {e}")))?;

        if updated.is_none() {
            // The row changed (or vanished) since the caller loaded it.
            return Err(ChatError::Conflict(session.session_id.clone()));
        }

        Ok(())
    }

    async fn get(&self, user_id: &str, session_id: &str) -> Result<Option<ChatSession>> {
        let record: Option<SessionRecord> = self
            .db
            .query(
                "SELECT * FROM session WHERE session_id = $session_id AND user_id = $user_id LIMIT 1",
            )
            .bind(("session_id", session_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(|e| ChatError::Storage(format!("Failed to query session: {e}")))?
            .take(0)
            .map_err(|e| ChatError::Storage(format!("Failed to parse session: {e}")))?;

        Ok(record.map(ChatSession::from))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ChatSession>> {
        let records: Vec<SessionRecord> = self
            .db
            .query(
                "SELECT * FROM session WHERE user_id = $user_id ORDER BY last_updated DESC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(|e| ChatError::Storage(format!("Failed to fetch sessions: {e}")))?
            .take(0)
            .map_err(|e| ChatError::Storage(format!("Failed to parse sessions: {e}")))?;

        Ok(records.into_iter().map(ChatSession::from).collect())
    }

    async fn delete(&self, user_id: &str, session_id: &str) -> Result<bool> {
        let deleted: Vec<SessionRecord> = self
            .db
            .query(
                "DELETE FROM session WHERE session_id = $session_id AND user_id = $user_id RETURN BEFORE",
            )
            .bind(("session_id", session_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(|e| ChatError::Storage(format!("Failed to delete session: {e}")))?
            .take(0)
            .map_err(|e| ChatError::Storage(format!("Failed to get delete result: {e}")))?;

        Ok(!deleted.is_empty())
    }
}
