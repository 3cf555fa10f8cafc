//! Assembly of streamed thought and answer fragments into display text.
//!
//! The model streams reasoning ("thought") fragments before answer fragments.
//! [`StreamAssembler`] labels them with markdown headers as they arrive:
//!
//! ```text
//! **Thoughts:**
//! <thought text>
//!
//! **Answer:**
//! <answer text>
//! ```

use crate::types::{GenerateContentResponse, Part};

/// Header emitted before the first thought fragment.
pub const THOUGHTS_HEADER: &str = "**Thoughts:**\n";

/// Header emitted before the first answer fragment.
pub const ANSWER_HEADER: &str = "**Answer:**\n";

/// Marker appended to in-progress text while the stream is open.
pub const CURSOR: &str = "▌";

/// Whether a fragment is model reasoning or part of the answer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FragmentKind {
    Thought,
    Answer,
}

/// A labeled piece of streamed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
}

impl Fragment {
    /// A thought fragment.
    pub fn thought(text: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Thought,
            text: text.into(),
        }
    }

    /// An answer fragment.
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Answer,
            text: text.into(),
        }
    }

    fn from_part(part: &Part) -> Option<Self> {
        let text = part.text.as_deref()?;
        if part.is_thought() {
            Some(Self::thought(text))
        } else {
            Some(Self::answer(text))
        }
    }
}

/// Extract the labeled fragments carried by one streamed chunk.
///
/// Parts without text (e.g. inline data) contribute nothing.
pub fn fragments(chunk: &GenerateContentResponse) -> Vec<Fragment> {
    chunk.parts().filter_map(Fragment::from_part).collect()
}

/// Which headers have been written so far.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum HeaderState {
    /// Nothing written yet.
    #[default]
    NoneEmitted,
    /// The thoughts header has been written; no answer yet.
    ThoughtHeaderEmitted,
    /// The answer header has been written.
    AnswerHeaderEmitted,
}

/// Accumulates fragments into the cumulative rendered text.
///
/// Fragments are appended strictly in arrival order. A thought arriving after
/// the answer has started is appended as-is without a new header.
#[derive(Debug, Default, Clone)]
pub struct StreamAssembler {
    state: HeaderState,
    text: String,
}

impl StreamAssembler {
    /// A fresh assembler with nothing emitted.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current header state.
    pub fn state(&self) -> HeaderState {
        self.state
    }

    /// Append one fragment, emitting headers on state transitions.
    pub fn push(&mut self, fragment: &Fragment) {
        match (self.state, fragment.kind) {
            (HeaderState::NoneEmitted, FragmentKind::Thought) => {
                self.text.push_str(THOUGHTS_HEADER);
                self.state = HeaderState::ThoughtHeaderEmitted;
            }
            (HeaderState::NoneEmitted, FragmentKind::Answer) => {
                self.text.push_str(ANSWER_HEADER);
                self.state = HeaderState::AnswerHeaderEmitted;
            }
            (HeaderState::ThoughtHeaderEmitted, FragmentKind::Answer) => {
                self.text.push_str("\n\n");
                self.text.push_str(ANSWER_HEADER);
                self.state = HeaderState::AnswerHeaderEmitted;
            }
            (HeaderState::ThoughtHeaderEmitted, FragmentKind::Thought)
            | (HeaderState::AnswerHeaderEmitted, _) => {}
        }
        self.text.push_str(&fragment.text);
    }

    /// The text so far, without the cursor.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text so far with the trailing cursor marker, for live display.
    pub fn partial(&self) -> String {
        format!("{}{CURSOR}", self.text)
    }

    /// Consume the assembler and return the committed text.
    pub fn finish(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assemble(fragments: &[Fragment]) -> String {
        let mut assembler = StreamAssembler::new();
        for fragment in fragments {
            assembler.push(fragment);
        }
        assembler.finish()
    }

    #[test]
    fn thoughts_then_answer() {
        let text = assemble(&[
            Fragment::thought("A"),
            Fragment::thought("B"),
            Fragment::answer("C"),
        ]);
        assert_eq!(text, "**Thoughts:**\nAB\n\n**Answer:**\nC");
    }

    #[test]
    fn answer_only() {
        assert_eq!(assemble(&[Fragment::answer("X")]), "**Answer:**\nX");
    }

    #[test]
    fn thoughts_only() {
        assert_eq!(assemble(&[Fragment::thought("hmm")]), "**Thoughts:**\nhmm");
    }

    #[test]
    fn empty_stream() {
        assert_eq!(assemble(&[]), "");
    }

    #[test]
    fn late_thought_is_not_reordered() {
        let text = assemble(&[
            Fragment::answer("X"),
            Fragment::thought("Y"),
            Fragment::answer("Z"),
        ]);
        assert_eq!(text, "**Answer:**\nXYZ");
    }

    #[test]
    fn state_transitions() {
        let mut assembler = StreamAssembler::new();
        assert_eq!(assembler.state(), HeaderState::NoneEmitted);
        assembler.push(&Fragment::thought("a"));
        assert_eq!(assembler.state(), HeaderState::ThoughtHeaderEmitted);
        assembler.push(&Fragment::thought("b"));
        assert_eq!(assembler.state(), HeaderState::ThoughtHeaderEmitted);
        assembler.push(&Fragment::answer("c"));
        assert_eq!(assembler.state(), HeaderState::AnswerHeaderEmitted);
    }

    #[test]
    fn partial_has_cursor() {
        let mut assembler = StreamAssembler::new();
        assembler.push(&Fragment::answer("Hel"));
        assert_eq!(assembler.partial(), "**Answer:**\nHel▌");
        assert_eq!(assembler.text(), "**Answer:**\nHel");
    }

    #[test]
    fn fragments_from_chunk() {
        let chunk: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"text": "think", "thought": true},
                {"inlineData": {"mimeType": "image/png", "data": ""}},
                {"text": "say"}
            ]}}]
        }))
        .unwrap();
        assert_eq!(
            fragments(&chunk),
            vec![Fragment::thought("think"), Fragment::answer("say")]
        );
    }
}
