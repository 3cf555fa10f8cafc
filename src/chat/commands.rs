//! Input parsing for the chat application.
//!
//! Every line the user enters becomes an [`Action`]. Lines starting with `/`
//! are commands that control the session; everything else is a prompt.

use std::path::PathBuf;

use crate::chat::export::ExportFormat;

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a prompt to the model.
    Submit(String),

    /// Clear the conversation history.
    Clear,

    /// Replace the last assistant reply with a fresh one.
    Regenerate,

    /// Save a copy of the conversation under a name.
    Save(String),

    /// Replace the conversation with a saved copy.
    Load(String),

    /// List saved conversations.
    ListSaved,

    /// Change the model.
    Model(String),

    /// Set the thinking budget.
    Thinking(u32),

    /// Set or clear the system prompt.
    /// `None` clears the current system prompt.
    System(Option<String>),

    /// Attach a file to the next request.
    Attach(PathBuf),

    /// Drop the pending attachment.
    Detach,

    /// Write the conversation to a file.
    Export(ExportFormat, PathBuf),

    /// Replace the conversation with one read from a JSON file.
    Import(PathBuf),

    /// Print the full transcript.
    History,

    /// Toggle streamed output.
    Stream(bool),

    /// Show the current configuration.
    ShowConfig,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses one line of user input.
///
/// Prompts are returned untrimmed.
///
/// # Examples
///
/// ```
/// # use sparkchat::chat::{Action, parse_action};
/// assert_eq!(parse_action("/quit"), Action::Quit);
/// assert_eq!(parse_action("/thinking 1024"), Action::Thinking(1024));
/// assert_eq!(parse_action("Hello!"), Action::Submit("Hello!".to_string()));
/// ```
pub fn parse_action(input: &str) -> Action {
    let Some(body) = input.trim().strip_prefix('/') else {
        return Action::Submit(input.to_string());
    };

    let mut parts = body.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_lowercase();
    let argument = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match command.as_str() {
        "clear" => Action::Clear,
        "regenerate" | "regen" => Action::Regenerate,
        "save" => match argument {
            Some(name) => Action::Save(name.to_string()),
            None => Action::Invalid("/save requires a chat name".to_string()),
        },
        "load" => match argument {
            Some(name) => Action::Load(name.to_string()),
            None => Action::Invalid("/load requires a chat name".to_string()),
        },
        "saved" => Action::ListSaved,
        "model" => match argument {
            Some(model) => Action::Model(model.to_string()),
            None => Action::Invalid("/model requires a model name".to_string()),
        },
        "thinking" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("off") => Action::Thinking(0),
            Some(arg) => match arg.parse::<u32>() {
                Ok(budget) => Action::Thinking(budget),
                Err(_) => {
                    Action::Invalid("/thinking expects a non-negative token budget".to_string())
                }
            },
            None => Action::Invalid("/thinking requires a budget".to_string()),
        },
        "system" => Action::System(argument.map(|s| s.to_string())),
        "attach" => match argument {
            Some(path) => Action::Attach(PathBuf::from(path)),
            None => Action::Invalid("/attach requires a file path".to_string()),
        },
        "detach" => Action::Detach,
        "export" => parse_export(argument),
        "import" => match argument {
            Some(path) => Action::Import(PathBuf::from(path)),
            None => Action::Invalid("/import requires a file path".to_string()),
        },
        "history" => Action::History,
        "stream" => match argument.and_then(parse_on_off) {
            Some(value) => Action::Stream(value),
            None => Action::Invalid("/stream expects 'on' or 'off'".to_string()),
        },
        "config" => Action::ShowConfig,
        "help" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        _ => Action::Invalid(format!("Unknown command: /{command}")),
    }
}

fn parse_export(argument: Option<&str>) -> Action {
    let Some(arg) = argument else {
        return Action::Invalid("/export requires a format and a file path".to_string());
    };

    let mut parts = arg.splitn(2, char::is_whitespace);
    let format = parts.next().unwrap_or_default();
    let Some(path) = parts.next().map(str::trim).filter(|s| !s.is_empty()) else {
        return Action::Invalid("/export requires a file path".to_string());
    };
    match format.parse::<ExportFormat>() {
        Ok(format) => Action::Export(format, PathBuf::from(path)),
        Err(err) => Action::Invalid(format!("/export {err}")),
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history and attachment
  /regenerate            Ask again for the last reply
  /save <name>           Save this chat under a name
  /load <name>           Switch to a saved chat
  /saved                 List saved chats
  /model <name>          Change the model (e.g., /model gemini-2.5-pro)
  /thinking <budget>     Set the thinking token budget (0 or 'off' disables)
  /system [prompt]       Set system prompt (no argument clears it)
  /attach <file>         Attach a text/JSON file or image to the next prompt
  /detach                Drop the pending attachment
  /export json|text <f>  Write the chat to a file
  /import <file>         Replace the chat with one exported as JSON
  /history               Show the full transcript
  /stream on|off         Stream replies as they arrive
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}
