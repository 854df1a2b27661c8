// Public API exports
pub mod config;
pub mod domain;
pub mod shared;

// Server-side modules
pub mod handlers;
pub mod infrastructure;
pub mod provider;

// Client-side session mirror
pub mod client;
