// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod sse;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use client::{ChunkStream, Gemini, api_key_from_env};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use types::*;
