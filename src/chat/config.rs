//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use arrrg_derive::CommandLine;

use crate::chat::session::SessionConfig;
use crate::types::Model;

/// Command-line arguments for the spark-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-2.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Thinking token budget.
    #[arrrg(optional, "Thinking token budget, 0 disables (default: 0)", "TOKENS")]
    pub thinking_budget: Option<u32>,

    /// Wait for complete replies instead of streaming them.
    #[arrrg(flag, "Disable streamed replies")]
    pub no_stream: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Optional system prompt to set conversation context.
    pub system_prompt: Option<String>,

    /// Thinking token budget; zero disables thinking.
    pub thinking_budget: u32,

    /// Whether replies are streamed into a live node.
    pub stream: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.5-flash
    /// - Thinking: disabled
    /// - Streaming: enabled
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            system_prompt: None,
            thinking_budget: 0,
            stream: true,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    /// Sets the thinking budget.
    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = budget;
        self
    }

    /// Switches to blocking replies.
    pub fn without_streaming(mut self) -> Self {
        self.stream = false;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The request settings a new session starts with.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            model: self.model.clone(),
            thinking_budget: self.thinking_budget,
            system_prompt: self
                .system_prompt
                .clone()
                .filter(|p| !p.trim().is_empty()),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            model: args.model.map(Model::from).unwrap_or_default(),
            system_prompt: args.system,
            thinking_budget: args.thinking_budget.unwrap_or(0),
            stream: !args.no_stream,
            use_color: !args.no_color,
        }
    }
}
