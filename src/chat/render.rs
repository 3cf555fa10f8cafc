//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction. The transcript
//! is always drawn from the message list in order; while a response streams,
//! a single live node is overwritten in place until it is committed.

use std::io::{self, Write};

use crate::chat::stream::CURSOR;
use crate::types::{Message, MessageRole};
use crate::utils::time;

/// ANSI escape code for dim text (used for entry headers).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for role names).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the assistant role).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Erases the single-column cursor marker.
const ERASE_CURSOR: &str = "\x08 \x08";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Draw the complete transcript, in list order.
    fn render_transcript(&mut self, messages: &[Message]);

    /// Open the live node for a streaming response.
    fn begin_live(&mut self);

    /// Overwrite the live node with the latest partial text.
    ///
    /// Called once per incoming fragment; `text` is cumulative and usually
    /// ends with the cursor marker.
    fn update_live(&mut self, text: &str);

    /// Replace the live node with the final text and close it.
    fn commit_live(&mut self, text: &str);

    /// Print a complete assistant reply that was not streamed.
    fn print_reply(&mut self, message: &Message);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// One-line header for a transcript entry: role, timestamp and character count.
pub fn entry_header(message: &Message) -> String {
    let ts = message
        .ts
        .as_ref()
        .and_then(|ts| time::format(ts).ok())
        .unwrap_or_else(|| "-".to_string());
    format!("[{}] {} ({} chars)", message.role, ts, message.char_count())
}

/// One transcript entry: its header line followed by the content.
pub fn entry_text(message: &Message) -> String {
    format!("{}\n{}", entry_header(message), message.content)
}

/// The full transcript as plain text, entries separated by blank lines.
pub fn render_transcript_text(messages: &[Message]) -> String {
    messages
        .iter()
        .map(entry_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// In-memory renderer that keeps the rendered nodes.
///
/// Useful for embedding the chat in another surface and for tests.
#[derive(Debug, Default, Clone)]
pub struct TranscriptView {
    nodes: Vec<String>,
    live: Option<String>,
    live_updates: usize,
    errors: Vec<String>,
    info: Vec<String>,
}

impl TranscriptView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed nodes.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// The live node, if a stream is in progress.
    pub fn live(&self) -> Option<&str> {
        self.live.as_deref()
    }

    /// How many times the live node has been overwritten.
    pub fn live_updates(&self) -> usize {
        self.live_updates
    }

    /// Errors printed so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Informational lines printed so far.
    pub fn info(&self) -> &[String] {
        &self.info
    }
}

impl Renderer for TranscriptView {
    fn render_transcript(&mut self, messages: &[Message]) {
        self.nodes = messages.iter().map(entry_text).collect();
    }

    fn begin_live(&mut self) {
        self.live = Some(String::new());
        self.live_updates = 0;
    }

    fn update_live(&mut self, text: &str) {
        if let Some(live) = self.live.as_mut() {
            live.clear();
            live.push_str(text);
            self.live_updates += 1;
        }
    }

    fn commit_live(&mut self, text: &str) {
        self.live = None;
        self.nodes.push(text.to_string());
    }

    fn print_reply(&mut self, message: &Message) {
        self.nodes.push(entry_text(message));
    }

    fn print_error(&mut self, error: &str) {
        self.errors.push(error.to_string());
    }

    fn print_info(&mut self, info: &str) {
        self.info.push(info.to_string());
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// A terminal cannot rewrite earlier lines cheaply, so the live node is kept
/// in sync by printing only the text that was not yet shown. The cursor
/// marker is drawn after it and erased before the next write.
pub struct PlainTextRenderer {
    out: Box<dyn Write + Send>,
    use_color: bool,
    shown: Option<String>,
    cursor_drawn: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }

    /// Creates a renderer that writes to `out` instead of stdout.
    pub fn with_writer(out: impl Write + Send + 'static, use_color: bool) -> Self {
        Self {
            out: Box::new(out),
            use_color,
            shown: None,
            cursor_drawn: false,
        }
    }

    /// Flushes the output to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn print_entry(&mut self, message: &Message) {
        let header = entry_header(message);
        let _ = if self.use_color {
            let color = match message.role {
                MessageRole::User => ANSI_BOLD,
                MessageRole::Assistant => ANSI_CYAN,
            };
            writeln!(self.out, "{color}{header}{ANSI_RESET}")
        } else {
            writeln!(self.out, "{header}")
        };
        let _ = writeln!(self.out, "{}", message.content);
    }

    fn erase_cursor(&mut self) {
        if self.cursor_drawn {
            let _ = write!(self.out, "{ERASE_CURSOR}");
            self.cursor_drawn = false;
        }
    }

    /// Bring the terminal in line with `target`, which extends what is shown.
    fn sync_live(&mut self, target: &str) {
        let shown = self.shown.get_or_insert_with(String::new);
        match target.strip_prefix(shown.as_str()) {
            Some(suffix) => {
                let _ = write!(self.out, "{suffix}");
                shown.push_str(suffix);
            }
            None => {
                // Not an extension of the shown text; start the node over
                let _ = write!(self.out, "\n{target}");
                *shown = target.to_string();
            }
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn render_transcript(&mut self, messages: &[Message]) {
        if messages.is_empty() {
            self.print_info("(no messages)");
            return;
        }
        for (i, message) in messages.iter().enumerate() {
            if i > 0 {
                let _ = writeln!(self.out);
            }
            self.print_entry(message);
        }
        self.flush();
    }

    fn begin_live(&mut self) {
        self.shown = Some(String::new());
        self.cursor_drawn = false;
    }

    fn update_live(&mut self, text: &str) {
        self.erase_cursor();
        let (body, cursor) = match text.strip_suffix(CURSOR) {
            Some(body) => (body, true),
            None => (text, false),
        };
        self.sync_live(body);
        if cursor && self.use_color {
            let _ = write!(self.out, "{CURSOR}");
            self.cursor_drawn = true;
        }
        self.flush();
    }

    fn commit_live(&mut self, text: &str) {
        self.erase_cursor();
        self.sync_live(text);
        self.shown = None;
        let _ = writeln!(self.out);
        self.flush();
    }

    fn print_reply(&mut self, message: &Message) {
        self.print_entry(message);
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.erase_cursor();
        self.flush();
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        let _ = if self.use_color {
            writeln!(self.out, "{ANSI_DIM}{info}{ANSI_RESET}")
        } else {
            writeln!(self.out, "{info}")
        };
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::time::macros::datetime;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn header_shows_role_timestamp_and_length() {
        let message = Message::user("héllo").with_timestamp(datetime!(2025-06-01 08:00:00 UTC));
        assert_eq!(
            entry_header(&message),
            "[user] 2025-06-01T08:00:00Z (5 chars)"
        );
        assert_eq!(
            entry_header(&Message::assistant("ok")),
            "[assistant] - (2 chars)"
        );
    }

    #[test]
    fn transcript_is_deterministic() {
        let messages = vec![Message::user("a"), Message::assistant("b")];
        let first = render_transcript_text(&messages);
        assert_eq!(first, render_transcript_text(&messages));
        assert_eq!(
            first,
            "[user] - (1 chars)\na\n\n[assistant] - (1 chars)\nb"
        );
    }

    #[test]
    fn live_node_is_overwritten_in_place() {
        let mut view = TranscriptView::new();
        view.render_transcript(&[Message::user("q")]);
        view.begin_live();
        view.update_live("**Answer:**\nH▌");
        view.update_live("**Answer:**\nHi▌");
        assert_eq!(view.nodes().len(), 1);
        assert_eq!(view.live(), Some("**Answer:**\nHi▌"));
        assert_eq!(view.live_updates(), 2);

        view.commit_live("**Answer:**\nHi");
        assert!(view.live().is_none());
        assert_eq!(view.nodes().len(), 2);
        assert_eq!(view.nodes()[1], "**Answer:**\nHi");
    }

    #[test]
    fn update_without_live_node_is_ignored() {
        let mut view = TranscriptView::new();
        view.update_live("stray");
        assert!(view.live().is_none());
        assert_eq!(view.live_updates(), 0);
    }

    #[test]
    fn plain_renderer_tracks_shown_text() {
        let mut renderer = PlainTextRenderer::with_color(false);
        renderer.begin_live();
        renderer.update_live("ab▌");
        renderer.update_live("abcd▌");
        assert_eq!(renderer.shown.as_deref(), Some("abcd"));
        assert!(!renderer.cursor_drawn);
        renderer.commit_live("abcd");
        assert!(renderer.shown.is_none());
    }

    #[derive(Clone, Default)]
    struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn blocking_reply_matches_transcript_entry() {
        let buf = SharedBuf::default();
        let mut renderer = PlainTextRenderer::with_writer(buf.clone(), false);
        let message =
            Message::assistant("Try a Coral board.").with_timestamp(datetime!(2025-06-01 08:00:00 UTC));
        renderer.print_reply(&message);
        assert_eq!(
            buf.contents(),
            "[assistant] 2025-06-01T08:00:00Z (18 chars)\nTry a Coral board.\n"
        );

        let replayed = SharedBuf::default();
        let mut renderer = PlainTextRenderer::with_writer(replayed.clone(), false);
        renderer.render_transcript(std::slice::from_ref(&message));
        assert_eq!(buf.contents(), replayed.contents());
    }

    #[test]
    fn plain_renderer_streams_only_new_text() {
        let buf = SharedBuf::default();
        let mut renderer = PlainTextRenderer::with_writer(buf.clone(), false);
        renderer.begin_live();
        renderer.update_live("ab▌");
        renderer.update_live("abcd▌");
        renderer.commit_live("abcd");
        assert_eq!(buf.contents(), "abcd\n");
    }
}
