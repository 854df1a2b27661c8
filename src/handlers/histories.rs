//! Session listing handler

use axum::extract::Query;
use axum::{Extension, Json};
use serde::Deserialize;

use super::AppState;
use crate::domain::models::SessionSummary;
use crate::infrastructure::auth::{AuthenticatedUser, ensure_owner};
use crate::shared::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: String,
}

/// GET /api/chat/history?userId=
///
/// Returns every session the caller owns, most recently updated first,
/// without message bodies. No pagination; the result is the complete set.
pub async fn history_handler(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<SessionSummary>>> {
    ensure_owner(&user, &query.user_id)?;

    let sessions = state.manager.get_history(&query.user_id).await?;

    tracing::debug!(user_id = %query.user_id, count = sessions.len(), "Listed sessions");
    Ok(Json(sessions))
}
