//! HTTP access to the chat API
//!
//! Centralized typed calls; the cache and sync rules live in the sibling
//! modules.

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::models::{ChatRequest, ChatResponse, ChatSession, SessionSummary};

/// Shared HTTP client for all API instances
static HTTP: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Errors surfaced to the UI layer.
///
/// Everything except `Unauthorized` is recoverable: prior cache contents
/// stay valid and the operation may simply be retried. `Unauthorized`
/// forces re-authentication.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// API service for centralized HTTP requests
pub struct ChatApi {
    base_url: String,
    bearer_token: String,
}

impl ChatApi {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }

    // Generic GET request
    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        let response = HTTP
            .get(self.url(endpoint))
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        Self::decode(response).await
    }

    // Generic POST request
    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = HTTP
            .post(self.url(endpoint))
            .bearer_auth(&self.bearer_token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    // Generic DELETE request
    async fn delete(&self, endpoint: &str) -> Result<(), ClientError> {
        let response = HTTP
            .delete(self.url(endpoint))
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        Self::decode::<serde_json::Value>(response).await.map(|_| ())
    }

    // Specific API methods
    pub async fn submit_turn(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        self.post("/api/chat", request).await
    }

    pub async fn get_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>, ClientError> {
        self.get(&format!("/api/chat/history?userId={user_id}")).await
    }

    pub async fn get_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<ChatSession, ClientError> {
        self.get(&format!("/api/chat/sessions/{user_id}/{session_id}"))
            .await
    }

    pub async fn delete_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), ClientError> {
        self.delete(&format!("/api/chat/sessions/{user_id}/{session_id}"))
            .await
    }
}
