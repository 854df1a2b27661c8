//! Completion providers
//!
//! The session manager only depends on the `CompletionProvider` trait; the
//! hosted chat-completions service behind it is an external collaborator.

pub mod openai;
pub mod traits;

pub use openai::OpenAiProvider;
pub use traits::{CompletionError, CompletionProvider};
