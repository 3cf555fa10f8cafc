use serde::{Deserialize, Serialize};

use crate::types::{Content, Model, Part};

/// Body of a `generateContent` or `streamGenerateContent` request.
///
/// The model is carried in the URL, not the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns, oldest first.
    pub contents: Vec<Content>,

    /// Generation parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Create a request from conversation turns.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            ..Self::default()
        }
    }

    /// Attach a thinking configuration.
    pub fn with_thinking(mut self, thinking: ThinkingConfig) -> Self {
        self.generation_config
            .get_or_insert_with(GenerationConfig::default)
            .thinking_config = Some(thinking);
        self
    }
}

/// Generation parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Thinking configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

/// Controls the model's internal reasoning.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Token budget for reasoning. Zero disables thinking.
    pub thinking_budget: u32,

    /// Whether reasoning summaries are returned as thought parts.
    pub include_thoughts: bool,
}

impl ThinkingConfig {
    /// Build a configuration from a budget. Thoughts are requested whenever
    /// the budget is non-zero.
    pub fn from_budget(thinking_budget: u32) -> Self {
        Self {
            thinking_budget,
            include_thoughts: thinking_budget > 0,
        }
    }
}

/// Response body of `generateContent`, and of each streamed chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate responses; chat requests get at most one.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Token accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,

    /// The model version that served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<Model>,
}

impl GenerateContentResponse {
    /// Iterate over the parts of the first candidate.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
            .iter()
    }

    /// Concatenated answer text of the first candidate, skipping thought parts.
    pub fn text(&self) -> String {
        self.parts()
            .filter(|p| !p.is_thought())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

/// A single candidate response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Why generation stopped, e.g. `STOP` or `MAX_TOKENS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token usage reported by the API.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub thoughts_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}
