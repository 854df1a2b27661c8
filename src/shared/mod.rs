pub mod errors;

pub use errors::{ChatError, Result};
