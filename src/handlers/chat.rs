//! Chat turn handler

use axum::{Extension, Json};

use super::AppState;
use crate::domain::models::{ChatRequest, ChatResponse};
use crate::infrastructure::auth::{AuthenticatedUser, ensure_owner};
use crate::shared::Result;

/// POST /api/chat
///
/// Submits one turn: creates a session when `sessionId` is absent, appends
/// to it otherwise, and returns the generated reply with the session id the
/// caller must remember for subsequent turns.
pub async fn chat_handler(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    ensure_owner(&user, &request.user_id)?;

    tracing::info!(
        user_id = %request.user_id,
        session_id = ?request.session_id,
        include_history = ?request.include_history,
        "Chat turn received"
    );

    let outcome = state
        .manager
        .submit_turn(
            &request.user_id,
            request.session_id.as_deref(),
            &request.user_message,
            request.include_history.unwrap_or(false),
            request.turn_key.as_deref(),
        )
        .await?;

    Ok(Json(ChatResponse {
        response: outcome.response,
        session_id: outcome.session_id,
    }))
}
