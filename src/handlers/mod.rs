//! API surface
//!
//! Translates HTTP requests into session-manager calls and errors into
//! status codes. Callers are authenticated by the bearer middleware before
//! any handler runs; handlers additionally check that the owner named in
//! the request is the authenticated subject.

pub mod chat;
pub mod histories;
pub mod sessions;

pub use chat::chat_handler;
pub use histories::history_handler;
pub use sessions::{delete_session_handler, get_session_handler};

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domain::services::SessionManager;
use crate::infrastructure::auth::{TokenVerifier, require_auth};
use crate::shared::ChatError;

/// Shared state for all API handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SessionManager>,
    pub verifier: Arc<dyn TokenVerifier>,
}

/// Error payload for every non-2xx response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match &self {
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ChatError::Provider(_) => StatusCode::BAD_GATEWAY,
            ChatError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::Conflict(_) => StatusCode::CONFLICT,
            ChatError::Auth(_) => StatusCode::UNAUTHORIZED,
        };

        if status.is_server_error() {
            tracing::error!(status = %status, "Request failed: {}", self);
        } else {
            tracing::debug!(status = %status, "Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Build the API router with auth, request tracing and CORS applied.
/// NOTE: Axum 0.8 uses {param} syntax instead of :param
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/history", get(history_handler))
        .route(
            "/api/chat/sessions/{user_id}/{session_id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route_layer(middleware::from_fn(require_auth))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
