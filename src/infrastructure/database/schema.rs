//! Database schema definitions and migrations
//!
//! The session table is SCHEMALESS: each row is one full session document
//! with its nested message array. Indexes cover the two access paths,
//! point reads by (owner, session id) and the per-owner listing.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::shared::{ChatError, Result};

/// Run all database migrations
pub async fn run_migrations(db: &Surreal<Db>) -> Result<()> {
    tracing::info!("Running database migrations...");

    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS session SCHEMALESS;

        DEFINE INDEX IF NOT EXISTS idx_session_owner ON session FIELDS user_id;
        DEFINE INDEX IF NOT EXISTS idx_session_key ON session FIELDS user_id, session_id UNIQUE;
    "#,
    )
    .await
    .map_err(|e| ChatError::Storage(format!("Failed to create session table: {e}")))?;

    tracing::info!("Database migrations completed");
    Ok(())
}
