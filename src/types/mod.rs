// Public modules
pub mod attachment;
pub mod content;
pub mod generate_content;
pub mod message;
pub mod model;

// Re-exports
pub use attachment::{Attachment, ImageMediaType};
pub use content::{Content, ContentRole, InlineData, Part};
pub use generate_content::{
    Candidate, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ThinkingConfig,
    UsageMetadata,
};
pub use message::{Message, MessageRole};
pub use model::{KnownModel, Model};
