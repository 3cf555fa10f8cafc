//! Chat application module for brainstorming conversations with Gemini.
//!
//! This module provides a REPL chat interface built on top of the
//! sparkchat client library. It supports:
//!
//! - Streaming responses with separate thought and answer sections
//! - Named saved chats and JSON/text export
//! - Text, JSON and image attachments sent with the next prompt
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`session`]: Messages, saved chats and request settings
//! - [`prompt`]: Turning session state into a request
//! - [`invoker`]: Blocking and streamed model calls
//! - [`stream`]: The thought/answer header state machine
//! - [`render`]: Transcript and live-node rendering
//! - [`export`]: JSON and text export, JSON import
//! - [`commands`]: Parsing input into actions
//! - [`app`]: The reducer that applies actions to a session
//! - [`config`]: CLI argument parsing and configuration

pub mod app;
pub mod commands;
pub mod config;
pub mod export;
pub mod invoker;
pub mod prompt;
pub mod render;
pub mod session;
pub mod stream;

pub use app::{ChatApp, Control, SessionStats};
pub use commands::{Action, help_text, parse_action};
pub use config::{ChatArgs, ChatConfig};
pub use export::ExportFormat;
pub use invoker::{ModelBackend, Reply, invoke_blocking, invoke_streaming};
pub use render::{PlainTextRenderer, Renderer, TranscriptView};
pub use session::{SessionConfig, SessionStore};
pub use stream::{Fragment, FragmentKind, HeaderState, StreamAssembler};
