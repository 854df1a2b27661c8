//! Session retrieval and deletion handlers

use axum::extract::Path;
use axum::{Extension, Json};

use super::AppState;
use crate::domain::models::{ChatSession, DeleteSessionResponse};
use crate::infrastructure::auth::{AuthenticatedUser, ensure_owner};
use crate::shared::Result;

/// GET /api/chat/sessions/{user_id}/{session_id}
///
/// Full session document including the message array.
pub async fn get_session_handler(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((user_id, session_id)): Path<(String, String)>,
) -> Result<Json<ChatSession>> {
    ensure_owner(&user, &user_id)?;

    let session = state.manager.get_session(&user_id, &session_id).await?;
    Ok(Json(session))
}

/// DELETE /api/chat/sessions/{user_id}/{session_id}
///
/// Irreversibly removes the session.
pub async fn delete_session_handler(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((user_id, session_id)): Path<(String, String)>,
) -> Result<Json<DeleteSessionResponse>> {
    ensure_owner(&user, &user_id)?;

    tracing::info!(user_id = %user_id, session_id = %session_id, "Deleting session");
    state.manager.delete_session(&user_id, &session_id).await?;

    Ok(Json(DeleteSessionResponse {
        success: true,
        message: "Session deleted successfully".to_string(),
        session_id,
    }))
}
