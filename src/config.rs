//! Server configuration
//!
//! Everything comes from flags or the environment; secrets only from the
//! environment in practice.

use std::path::PathBuf;

use clap::Parser;

use crate::infrastructure::auth::StaticTokenVerifier;
use crate::shared::{ChatError, Result};

#[derive(Debug, Parser)]
#[command(
    name = "chat-session-hub",
    about = "Web chat API server with owner-partitioned session management"
)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Database directory (defaults to ~/.chat-session-hub/surreal)
    #[arg(long, env = "CHAT_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Keep sessions in memory instead of the embedded database
    #[arg(long, env = "CHAT_IN_MEMORY", default_value_t = false)]
    pub in_memory: bool,

    /// OpenAI-compatible completions endpoint
    #[arg(
        long,
        env = "OPENAI_BASE_URL",
        default_value = "https://api.openai.com/v1"
    )]
    pub openai_base_url: String,

    /// API key for the completion provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Model used for completions
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-35-turbo")]
    pub openai_model: String,

    /// Accepted bearer tokens as comma-separated token:subject pairs
    #[arg(long, env = "CHAT_API_TOKENS", value_delimiter = ',')]
    pub api_tokens: Vec<String>,
}

impl ServerConfig {
    /// Build the token verifier from the configured token:subject pairs.
    pub fn token_verifier(&self) -> Result<StaticTokenVerifier> {
        let mut verifier = StaticTokenVerifier::new();
        for pair in &self.api_tokens {
            let (token, subject) = pair.split_once(':').ok_or_else(|| {
                ChatError::Validation(format!(
                    "Malformed token pair (expected token:subject): {pair}"
                ))
            })?;
            if token.is_empty() || subject.is_empty() {
                return Err(ChatError::Validation(format!(
                    "Malformed token pair (expected token:subject): {pair}"
                )));
            }
            verifier = verifier.with_token(token, subject);
        }
        Ok(verifier)
    }
}
