//! Request assembly.
//!
//! Turns the session configuration, an optional attachment, the prior history
//! and the new user text into a Gemini request. Assembly is pure and cannot
//! fail.

use crate::chat::session::SessionConfig;
use crate::types::{
    Attachment, Content, ContentRole, GenerateContentRequest, Message, Part, ThinkingConfig,
};

/// Marker line opening attached context.
pub const CONTEXT_START: &str = "Context start:";

/// Marker line closing attached context.
pub const CONTEXT_END: &str = "Context end:";

/// Build the text of the outgoing user turn.
///
/// Segments are the system prompt, the attached text wrapped in context
/// markers, and the user text, in that order. Empty segments are dropped and
/// the rest are joined with blank lines.
pub fn assemble_text(
    config: &SessionConfig,
    attachment: Option<&Attachment>,
    user_text: &str,
) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(3);
    if let Some(system) = config.system_prompt.as_deref()
        && !system.is_empty()
    {
        segments.push(system.to_string());
    }
    if let Some(context) = attachment.and_then(Attachment::text)
        && !context.is_empty()
    {
        segments.push(format!("{CONTEXT_START}\n{context}\n{CONTEXT_END}"));
    }
    if !user_text.is_empty() {
        segments.push(user_text.to_string());
    }
    segments.join("\n\n")
}

/// Build role-tagged turns: one text part per prior message, then the current
/// user turn, which also carries the image when one is attached.
pub fn assemble_contents(
    history: &[Message],
    user_text: &str,
    image: Option<&Attachment>,
) -> Vec<Content> {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|message| {
            Content::new(
                message.role.content_role(),
                vec![Part::text(message.content.clone())],
            )
        })
        .collect();

    let mut parts = vec![Part::text(user_text)];
    if let Some(Attachment::Image { bytes, media_type }) = image {
        parts.push(Part::inline(bytes, media_type.as_str()));
    }
    contents.push(Content::new(ContentRole::User, parts));
    contents
}

/// Build the complete request for the next turn.
///
/// The system prompt and any text context are folded into the final user turn
/// via [`assemble_text`]; earlier messages travel as separate turns.
pub fn build_request(
    config: &SessionConfig,
    history: &[Message],
    attachment: Option<&Attachment>,
    user_text: &str,
) -> GenerateContentRequest {
    let text = assemble_text(config, attachment, user_text);
    let image = attachment.filter(|a| a.is_image());
    GenerateContentRequest::new(assemble_contents(history, &text, image))
        .with_thinking(ThinkingConfig::from_budget(config.thinking_budget))
}
