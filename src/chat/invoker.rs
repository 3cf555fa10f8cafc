//! Model invocation for chat turns.
//!
//! Both invocation styles turn every failure into assistant-visible text, so a
//! chat turn always produces a reply. The caller learns about the failure
//! through [`Reply::error`].

use async_trait::async_trait;
use futures::StreamExt;

use crate::chat::render::Renderer;
use crate::chat::stream::{StreamAssembler, fragments};
use crate::client::{ChunkStream, Gemini};
use crate::error::{Error, Result};
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

/// Prefix of the assistant text recorded when a model call fails.
pub const ERROR_PREFIX: &str = "[Error calling model]";

/// Something that can answer a generate request, blocking or streamed.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send a request and wait for the complete response.
    async fn generate(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    /// Send a request and get a stream of response chunks.
    async fn stream(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream>;
}

#[async_trait]
impl ModelBackend for Gemini {
    async fn generate(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        Gemini::generate(self, model, request).await
    }

    async fn stream(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream> {
        Gemini::stream(self, model, request).await
    }
}

/// The outcome of one invocation.
#[derive(Debug)]
pub struct Reply {
    /// Text to record as the assistant message.
    pub text: String,

    /// The failure folded into `text`, if any.
    pub error: Option<Error>,
}

impl Reply {
    fn ok(text: String) -> Self {
        Self { text, error: None }
    }

    /// Whether the call failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// The assistant text for a failed call.
pub fn error_text(err: &Error) -> String {
    format!("{ERROR_PREFIX} {}", err.message())
}

/// Make one blocking call and return the answer text.
pub async fn invoke_blocking(
    backend: &dyn ModelBackend,
    model: &Model,
    request: &GenerateContentRequest,
) -> Reply {
    match backend.generate(model, request).await {
        Ok(response) => Reply::ok(response.text()),
        Err(err) => Reply {
            text: error_text(&err),
            error: Some(err),
        },
    }
}

/// Stream a call into the renderer's live node and return the committed text.
///
/// Every fragment overwrites the live node with the cumulative text and a
/// trailing cursor. An error part way through keeps what already arrived and
/// appends the error text.
pub async fn invoke_streaming(
    backend: &dyn ModelBackend,
    model: &Model,
    request: &GenerateContentRequest,
    renderer: &mut dyn Renderer,
) -> Reply {
    renderer.begin_live();

    let mut stream = match backend.stream(model, request).await {
        Ok(stream) => stream,
        Err(err) => {
            let text = error_text(&err);
            renderer.commit_live(&text);
            return Reply {
                text,
                error: Some(err),
            };
        }
    };

    let mut assembler = StreamAssembler::new();
    let mut error = None;
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                for fragment in fragments(&chunk) {
                    assembler.push(&fragment);
                    renderer.update_live(&assembler.partial());
                }
            }
            Err(err) => {
                error = Some(err);
                break;
            }
        }
    }

    let mut text = assembler.finish();
    if let Some(err) = &error {
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(&error_text(err));
    }
    renderer.commit_live(&text);
    Reply { text, error }
}


#[cfg(test)]
mod tests {
    use super::testing::{Script, ScriptedBackend, chunk};
    use super::*;
    use crate::chat::render::TranscriptView;
    use crate::types::Content;

    fn request() -> GenerateContentRequest {
        GenerateContentRequest::new(vec![Content::user("hi")])
    }

    #[tokio::test]
    async fn blocking_returns_answer_text() {
        let backend = ScriptedBackend::new([Script::Text("Hello there".to_string())]);
        let reply = invoke_blocking(&backend, &Model::default(), &request()).await;
        assert_eq!(reply.text, "Hello there");
        assert!(!reply.is_error());
    }

    #[tokio::test]
    async fn blocking_joins_scripted_chunks() {
        let backend = ScriptedBackend::new([Script::Chunks(vec![
            Ok(chunk("Hel", false)),
            Ok(chunk("lo", false)),
        ])]);
        let reply = invoke_blocking(&backend, &Model::default(), &request()).await;
        assert_eq!(reply.text, "Hello");
    }

    #[tokio::test]
    async fn blocking_failure_becomes_text() {
        let backend = ScriptedBackend::new([Script::Fail(Error::timeout("timeout", None))]);
        let reply = invoke_blocking(&backend, &Model::default(), &request()).await;
        assert_eq!(reply.text, "[Error calling model] timeout");
        assert!(reply.error.unwrap().is_timeout());
    }

    #[tokio::test]
    async fn streaming_assembles_thoughts_and_answer() {
        let backend = ScriptedBackend::new([Script::Chunks(vec![
            Ok(chunk("A", true)),
            Ok(chunk("B", true)),
            Ok(chunk("C", false)),
        ])]);
        let mut view = TranscriptView::new();
        let reply = invoke_streaming(&backend, &Model::default(), &request(), &mut view).await;

        assert_eq!(reply.text, "**Thoughts:**\nAB\n\n**Answer:**\nC");
        assert_eq!(view.live_updates(), 3);
        assert!(view.live().is_none());
        assert_eq!(view.nodes(), ["**Thoughts:**\nAB\n\n**Answer:**\nC".to_string()]);
    }

    #[tokio::test]
    async fn streaming_shows_cursor_until_commit() {
        let backend = ScriptedBackend::new([Script::Chunks(vec![Ok(chunk("X", false))])]);

        struct Spy(Vec<String>);
        impl Renderer for Spy {
            fn render_transcript(&mut self, _: &[crate::types::Message]) {}
            fn begin_live(&mut self) {}
            fn update_live(&mut self, text: &str) {
                self.0.push(text.to_string());
            }
            fn commit_live(&mut self, text: &str) {
                self.0.push(text.to_string());
            }
            fn print_reply(&mut self, _: &crate::types::Message) {}
            fn print_error(&mut self, _: &str) {}
            fn print_info(&mut self, _: &str) {}
        }

        let mut spy = Spy(Vec::new());
        invoke_streaming(&backend, &Model::default(), &request(), &mut spy).await;
        assert_eq!(spy.0, vec!["**Answer:**\nX▌", "**Answer:**\nX"]);
    }

    #[tokio::test]
    async fn streaming_error_keeps_partial_text() {
        let backend = ScriptedBackend::new([Script::Chunks(vec![
            Ok(chunk("Part", false)),
            Err(Error::connection("connection reset", None)),
            Ok(chunk("never", false)),
        ])]);
        let mut view = TranscriptView::new();
        let reply = invoke_streaming(&backend, &Model::default(), &request(), &mut view).await;
        assert_eq!(
            reply.text,
            "**Answer:**\nPart\n\n[Error calling model] connection reset"
        );
        assert!(reply.is_error());
    }

    #[tokio::test]
    async fn streaming_open_failure_commits_error() {
        let backend = ScriptedBackend::new([Script::Fail(Error::authentication("bad key"))]);
        let mut view = TranscriptView::new();
        let reply = invoke_streaming(&backend, &Model::default(), &request(), &mut view).await;
        assert_eq!(reply.text, "[Error calling model] bad key");
        assert_eq!(view.nodes(), ["[Error calling model] bad key".to_string()]);
    }
}
