//! Completion provider trait and error types
//!
//! Providers turn an ordered message history into one generated reply. The
//! caller suspends until the full reply exists; any streaming is an internal
//! detail of the implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::ChatMessage;

/// Errors that can occur while generating a completion
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Provider produced an empty completion")]
    EmptyCompletion,
}

/// Trait for completion providers
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a reply for the last (user) message in `history`.
    ///
    /// `history` is the ordered conversation to send: either the single new
    /// user message, or the full prior sequence ending with it.
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, CompletionError>;
}
