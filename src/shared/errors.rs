use thiserror::Error;

/// Error taxonomy for session operations.
///
/// Every variant maps to exactly one HTTP status at the API surface
/// (see `handlers`): 400, 404, 502, 500, 409, 401 in declaration order.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Completion provider error: {0}")]
    Provider(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Write conflict on session: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Auth(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;
