//! Session persistence
//!
//! This module provides:
//! - The `SessionStore` trait the session manager writes through
//! - Embedded SurrealDB connection and schema
//! - The SurrealDB-backed store and an in-memory store for tests/dev

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod schema;
pub mod store;

pub use connection::{Database, default_db_path, init_database, try_get_database};
pub use memory::MemorySessionStore;
pub use repositories::SurrealSessionStore;
pub use schema::run_migrations;
pub use store::SessionStore;
