//! Chat API server
//!
//! Run with: PORT=3001 OPENAI_API_KEY=... CHAT_API_TOKENS=token:subject cargo run --bin server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use chat_session_hub::config::ServerConfig;
use chat_session_hub::domain::services::SessionManager;
use chat_session_hub::handlers::{AppState, api_router};
use chat_session_hub::infrastructure::database::{
    MemorySessionStore, SessionStore, SurrealSessionStore, init_database,
};
use chat_session_hub::provider::OpenAiProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::parse();

    tracing::info!("Starting chat-session-hub API server...");

    let store: Arc<dyn SessionStore> = if config.in_memory {
        tracing::warn!("Using in-memory session store; sessions will not survive restarts");
        Arc::new(MemorySessionStore::new())
    } else {
        let db = init_database(config.db_path.clone())
            .await
            .context("Failed to initialize database")?;
        Arc::new(SurrealSessionStore::new(db))
    };

    let provider = Arc::new(OpenAiProvider::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    ));

    if config.api_tokens.is_empty() {
        tracing::warn!("No API tokens configured; every request will be rejected");
    }
    let verifier = config.token_verifier().context("Invalid token config")?;

    let manager = Arc::new(SessionManager::new(store, provider));
    let app = api_router(AppState {
        manager,
        verifier: Arc::new(verifier),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
