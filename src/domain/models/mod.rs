// Domain models (business entities and wire types)
// Pure Rust, no framework dependencies

pub mod chat;
pub mod message;
pub mod session;

pub use chat::{ChatRequest, ChatResponse, DeleteSessionResponse};
pub use message::ChatMessage;
pub use session::{ChatSession, DEFAULT_SESSION_NAME, SessionSummary, TurnReceipt};
