//! The chat reducer.
//!
//! [`ChatApp`] owns the session and the model backend. Each [`Action`] runs to
//! completion against that state and reports what happened through a
//! [`Renderer`].

use crate::chat::commands::{Action, help_text};
use crate::chat::export::{self, ExportFormat};
use crate::chat::invoker::{ModelBackend, Reply, invoke_blocking, invoke_streaming};
use crate::chat::prompt::build_request;
use crate::chat::render::Renderer;
use crate::chat::session::SessionStore;
use crate::error::{Error, Result};
use crate::observability::{SESSION_MODEL_ERRORS, SESSION_TURNS};
use crate::types::{Attachment, Message, MessageRole, Model};

use std::path::Path;

/// Whether the event loop should keep reading input.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Counters for the current session.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Completed model turns, including regenerations.
    pub turns: u64,
    /// Turns whose reply is an error message.
    pub model_errors: u64,
}

/// Interactive chat state plus the backend that answers prompts.
pub struct ChatApp<B: ModelBackend> {
    store: SessionStore,
    backend: B,
    stream: bool,
    stats: SessionStats,
}

impl<B: ModelBackend> ChatApp<B> {
    /// Creates an app around an existing session.
    pub fn new(backend: B, store: SessionStore, stream: bool) -> Self {
        Self {
            store,
            backend,
            stream,
            stats: SessionStats::default(),
        }
    }

    /// The session state.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The model backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether replies are streamed.
    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    /// Session counters.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Apply one action.
    pub async fn dispatch(&mut self, action: Action, renderer: &mut dyn Renderer) -> Control {
        match action {
            Action::Submit(text) => {
                if let Err(err) = self.submit(&text, renderer).await {
                    renderer.print_error(err.message());
                }
            }
            Action::Regenerate => self.regenerate(renderer).await,
            Action::Clear => {
                self.store.clear();
                renderer.print_info("Conversation cleared.");
            }
            Action::Save(name) => match self.store.save(&name) {
                Ok(()) => renderer.print_info(&format!("Saved chat '{}'.", name.trim())),
                Err(err) => renderer.print_error(err.message()),
            },
            Action::Load(name) => {
                if self.store.load(&name) {
                    renderer.render_transcript(self.store.messages());
                    renderer.print_info(&format!("Loaded chat '{}'.", name.trim()));
                } else {
                    renderer.print_info(&format!("No saved chat named '{}'.", name.trim()));
                }
            }
            Action::ListSaved => {
                let names: Vec<&str> = self.store.saved_names().collect();
                if names.is_empty() {
                    renderer.print_info("No saved chats.");
                } else {
                    renderer.print_info(&format!("Saved chats: {}", names.join(", ")));
                }
            }
            Action::Model(name) => {
                let model = Model::from(name);
                renderer.print_info(&format!("Model changed to: {model}"));
                self.store.set_model(model);
            }
            Action::Thinking(budget) => {
                self.store.set_thinking_budget(budget);
                if budget == 0 {
                    renderer.print_info("Thinking disabled.");
                } else {
                    renderer.print_info(&format!("Thinking budget set to {budget} tokens."));
                }
            }
            Action::System(prompt) => {
                self.store.set_system_prompt(prompt);
                match &self.store.config().system_prompt {
                    Some(p) => renderer.print_info(&format!("System prompt set to: {p}")),
                    None => renderer.print_info("System prompt cleared."),
                }
            }
            Action::Attach(path) => match Attachment::from_path(&path) {
                Ok(attachment) => {
                    let description = attachment.describe();
                    if self.store.attach(attachment).is_some() {
                        renderer.print_info(&format!(
                            "Replaced the pending attachment with {description}."
                        ));
                    } else {
                        renderer.print_info(&format!("Attached {description}."));
                    }
                }
                Err(err) => renderer.print_error(&err.to_string()),
            },
            Action::Detach => match self.store.take_attachment() {
                Some(attachment) => {
                    renderer.print_info(&format!("Dropped {}.", attachment.describe()))
                }
                None => renderer.print_info("Nothing attached."),
            },
            Action::Export(format, path) => match self.export(format, &path) {
                Ok(()) => renderer.print_info(&format!(
                    "Exported {} messages to {}.",
                    self.store.message_count(),
                    path.display()
                )),
                Err(err) => renderer.print_error(&err.to_string()),
            },
            Action::Import(path) => match self.import(&path) {
                Ok(count) => {
                    renderer.render_transcript(self.store.messages());
                    renderer.print_info(&format!("Imported {count} messages."));
                }
                Err(err) => renderer.print_error(&err.to_string()),
            },
            Action::History => renderer.render_transcript(self.store.messages()),
            Action::Stream(on) => {
                self.stream = on;
                if on {
                    renderer.print_info("Streaming enabled.");
                } else {
                    renderer.print_info("Streaming disabled.");
                }
            }
            Action::ShowConfig => {
                for line in self.describe_config() {
                    renderer.print_info(&line);
                }
            }
            Action::Help => {
                for line in help_text().lines() {
                    renderer.print_info(line);
                }
            }
            Action::Quit => return Control::Quit,
            Action::Invalid(message) => renderer.print_error(&message),
        }
        Control::Continue
    }

    /// Send a prompt and record both sides of the turn.
    ///
    /// The transcript grows by exactly two messages unless the prompt is
    /// empty; model failures become the assistant reply.
    ///
    /// # Errors
    ///
    /// Returns a validation error, and changes nothing, if `text` is blank.
    pub async fn submit(&mut self, text: &str, renderer: &mut dyn Renderer) -> Result<&Message> {
        if text.trim().is_empty() {
            return Err(Error::validation(
                "Prompt required",
                Some("prompt".to_string()),
            ));
        }
        let history = self.store.messages().to_vec();
        self.store.append(Message::user(text));
        Ok(self.respond(&history, text, renderer).await)
    }

    /// Replace the last assistant reply by asking again.
    ///
    /// The last user message stays where it is and is not duplicated.
    /// An unanswered last user message gets its first reply; earlier
    /// replies are never touched.
    pub async fn regenerate(&mut self, renderer: &mut dyn Renderer) {
        let messages = self.store.messages();
        let Some(cut) = messages.iter().rposition(|m| m.role == MessageRole::User) else {
            renderer.print_info("Nothing to regenerate yet.");
            return;
        };
        let user_text = messages[cut].content.clone();
        let answered = messages[cut + 1..]
            .iter()
            .any(|m| m.role == MessageRole::Assistant);
        if answered {
            self.store.remove_last(MessageRole::Assistant);
        }

        let history = self.store.messages()[..cut].to_vec();
        self.respond(&history, &user_text, renderer).await;
    }

    async fn respond(
        &mut self,
        history: &[Message],
        user_text: &str,
        renderer: &mut dyn Renderer,
    ) -> &Message {
        let attachment = self.store.take_attachment();
        let config = self.store.config().clone();
        let request = build_request(&config, history, attachment.as_ref(), user_text);

        let reply: Reply = if self.stream {
            invoke_streaming(&self.backend, &config.model, &request, renderer).await
        } else {
            invoke_blocking(&self.backend, &config.model, &request).await
        };

        SESSION_TURNS.click();
        self.stats.turns += 1;
        if reply.is_error() {
            SESSION_MODEL_ERRORS.click();
            self.stats.model_errors += 1;
        }

        let message = self.store.append(Message::assistant(reply.text));
        if !self.stream {
            renderer.print_reply(message);
        }
        message
    }

    fn export(&self, format: ExportFormat, path: &Path) -> Result<()> {
        export::export_to_path(self.store.messages(), format, path)
    }

    fn import(&mut self, path: &Path) -> Result<usize> {
        let messages = export::import_from_path(path)?;
        let count = messages.len();
        self.store.replace_history(messages);
        Ok(count)
    }

    fn describe_config(&self) -> Vec<String> {
        let config = self.store.config();
        vec![
            "Current Configuration:".to_string(),
            format!("  Model: {}", config.model),
            format!("  Thinking budget: {}", config.thinking_budget),
            format!(
                "  System prompt: {}",
                config.system_prompt.as_deref().unwrap_or("(none)")
            ),
            format!(
                "  Attachment: {}",
                self.store
                    .attachment()
                    .map(Attachment::describe)
                    .unwrap_or_else(|| "(none)".to_string())
            ),
            format!("  Streaming: {}", if self.stream { "on" } else { "off" }),
            format!("  Messages: {}", self.store.message_count()),
            format!(
                "  Turns: {} ({} failed)",
                self.stats.turns, self.stats.model_errors
            ),
        ]
    }
}
