//! Interactive chat for brainstorming EdgeAI ideas with Gemini.
//!
//! This binary provides a streaming REPL interface for chatting with Gemini
//! models via the generative-language API.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! spark-chat
//!
//! # Specify a model and a thinking budget
//! spark-chat --model gemini-2.5-pro --thinking-budget 1024
//!
//! # Set a system prompt
//! spark-chat --system "You are an embedded systems mentor"
//!
//! # Wait for complete replies and disable colors (useful for piping output)
//! spark-chat --no-stream --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/attach <file>` - Send a text, JSON or image file with the next prompt
//! - `/regenerate` - Ask again for the last reply
//! - `/save <name>` and `/load <name>` - Keep named copies of the chat
//! - `/export json|text <file>` - Write the chat to disk
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use sparkchat::Gemini;
use sparkchat::chat::{
    Action, ChatApp, ChatArgs, ChatConfig, Control, PlainTextRenderer, Renderer, SessionStore,
    parse_action,
};

const TITLE: &str = "EdgeAI Idea Spark Chat";
const GREETING: &str = "Hello! How can I spark your EdgeAI ideas today?";

/// Main entry point for the spark-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("spark-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    // A missing key is fatal before the REPL opens
    let client = Gemini::new(None)?;
    let store = SessionStore::new(config.session_config());
    let mut app = ChatApp::new(client, store, config.stream);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!("{TITLE} (model: {})", app.store().config().model);
    println!("Type /help for commands, /quit to exit\n");
    println!("Gemini: {GREETING}\n");

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let action = parse_action(&line);
                let replies = match &action {
                    Action::Submit(_) => true,
                    Action::Regenerate => app.store().last_user_message().is_some(),
                    _ => false,
                };
                if replies {
                    println!("Gemini:");
                }
                if app.dispatch(action, &mut renderer).await == Control::Quit {
                    println!("Goodbye!");
                    break;
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}
