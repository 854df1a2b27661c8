//! SurrealDB connection management
//!
//! Provides the embedded database connection, stored under
//! `~/.chat-session-hub/surreal/` unless the server is configured otherwise.

use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};
use tokio::sync::OnceCell;

use super::schema::run_migrations;
use crate::shared::{ChatError, Result};

/// Database connection wrapper
pub type Database = Arc<Surreal<Db>>;

/// Global database instance (singleton)
static DB: OnceCell<Database> = OnceCell::const_new();

/// Default database directory (`~/.chat-session-hub/surreal/`)
pub fn default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| ChatError::Storage("HOME environment variable not set".to_string()))?;

    Ok(PathBuf::from(home).join(".chat-session-hub").join("surreal"))
}

/// Initialize the embedded database connection and run migrations.
/// This should be called once at server startup.
pub async fn init_database(path: Option<PathBuf>) -> Result<Database> {
    if let Some(db) = DB.get() {
        return Ok(db.clone());
    }

    let db_path = match path {
        Some(path) => path,
        None => default_db_path()?,
    };
    std::fs::create_dir_all(&db_path)
        .map_err(|e| ChatError::Storage(format!("Failed to create database directory: {e}")))?;

    tracing::info!(path = ?db_path, "Initializing SurrealDB");

    let db = Surreal::new::<RocksDb>(db_path)
        .await
        .map_err(|e| ChatError::Storage(format!("Failed to connect to SurrealDB: {e}")))?;

    db.use_ns("chat_hub")
        .use_db("main")
        .await
        .map_err(|e| ChatError::Storage(format!("Failed to select namespace/database: {e}")))?;

    run_migrations(&db).await?;

    let db = Arc::new(db);
    DB.set(db.clone())
        .map_err(|_| ChatError::Storage("Database already initialized".to_string()))?;

    tracing::info!("SurrealDB initialized successfully");

    Ok(db)
}

/// Try to get the database connection (returns None if not initialized)
pub fn try_get_database() -> Option<Database> {
    DB.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path() {
        let path = default_db_path().unwrap();
        assert!(path.to_string_lossy().contains(".chat-session-hub"));
    }

    #[tokio::test]
    async fn test_init_database_creates_directory_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surreal");

        let db = init_database(Some(path.clone())).await.unwrap();
        assert!(path.exists());

        // Later calls return the initialized singleton.
        let again = init_database(None).await.unwrap();
        assert!(Arc::ptr_eq(&db, &again));
        assert!(try_get_database().is_some());
    }
}
