use base64::Engine;
use serde::{Deserialize, Serialize};

/// Role attached to a turn in a Gemini request.
///
/// Gemini names the assistant side `model`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    /// User turn.
    User,

    /// Model turn.
    Model,
}

/// A single turn of conversation: a role and an ordered list of parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// The producer of the content. Omitted for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,

    /// The parts making up this turn.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a new turn with the given role and parts.
    pub fn new(role: ContentRole, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role),
            parts,
        }
    }

    /// Create a user turn holding a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ContentRole::User, vec![Part::text(text)])
    }
}

/// One piece of a turn. Exactly one of `text` or `inline_data` is normally set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// True when this part carries the model's reasoning rather than its answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,

    /// Inline binary data, e.g. an image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create an inline data part from raw bytes.
    pub fn inline(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            inline_data: Some(InlineData::from_bytes(bytes, mime_type)),
            ..Self::default()
        }
    }

    /// Returns true if the API marked this part as reasoning.
    pub fn is_thought(&self) -> bool {
        self.thought.unwrap_or(false)
    }
}

/// Base64-encoded binary payload with its MIME type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the data, e.g. `image/png`.
    pub mime_type: String,

    /// Base64-encoded bytes.
    pub data: String,
}

impl InlineData {
    /// Encode raw bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}
