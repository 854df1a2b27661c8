use async_trait::async_trait;

use crate::domain::models::ChatSession;
use crate::shared::Result;

/// Persistence contract for session documents.
///
/// Documents are keyed by (owner, session id); owner partitioning is the only
/// isolation the store is expected to provide. Writes are conditional on the
/// version observed when the session was loaded, so concurrent turns on the
/// same session fail with `ChatError::Conflict` instead of losing updates.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write a session document.
    ///
    /// `expected_version` is the version the caller loaded before mutating;
    /// `None` asserts the key does not exist yet (creation).
    async fn upsert(&self, session: &ChatSession, expected_version: Option<u64>) -> Result<()>;

    /// Point read by (owner, session id).
    async fn get(&self, user_id: &str, session_id: &str) -> Result<Option<ChatSession>>;

    /// All sessions owned by `user_id`. No pagination; callers treat the
    /// result as the complete set.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ChatSession>>;

    /// Remove a session. Returns `true` when a document was actually deleted.
    async fn delete(&self, user_id: &str, session_id: &str) -> Result<bool>;
}
