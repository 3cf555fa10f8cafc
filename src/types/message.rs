use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::ContentRole;

/// Who wrote a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl MessageRole {
    /// The role name used by the Gemini API.
    pub fn content_role(&self) -> ContentRole {
        match self {
            MessageRole::User => ContentRole::User,
            MessageRole::Assistant => ContentRole::Model,
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single entry of the chat transcript.
///
/// This is also the export format: `{"role", "content", "ts"?}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// The author of the message.
    pub role: MessageRole,

    /// The message text.
    pub content: String,

    /// When the message was added to the session, if known.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::time::option"
    )]
    pub ts: Option<OffsetDateTime>,
}

impl Message {
    /// Create an unstamped message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            ts: None,
        }
    }

    /// Create an unstamped user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an unstamped assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Returns the message with the given timestamp.
    pub fn with_timestamp(mut self, ts: OffsetDateTime) -> Self {
        self.ts = Some(ts);
        self
    }

    /// Number of characters (not bytes) in the content.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}
