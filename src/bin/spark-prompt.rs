//! Send a single prompt to Gemini and print the answer.
//!
//! # Usage
//!
//! ```bash
//! # Ask the default question
//! spark-prompt
//!
//! # Ask something else with another model
//! spark-prompt --model gemini-2.5-pro "Name three microcontrollers that can run TinyML"
//!
//! # Let the model think first
//! spark-prompt --thinking-budget 1024 "Plan a keyword-spotting demo"
//!
//! # Show the raw request and response on stderr
//! spark-prompt --verbose
//! ```

use std::sync::Arc;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use sparkchat::{
    ClientLogger, Content, Gemini, GenerateContentRequest, GenerateContentResponse, Model,
    ThinkingConfig,
};

/// Prompt sent when none is given on the command line.
const DEFAULT_PROMPT: &str = "Explain how AI works in a 100 words";

/// Command-line arguments for the spark-prompt tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct Args {
    /// Model to use.
    #[arrrg(optional, "Model to use (default: gemini-2.5-flash)", "MODEL")]
    model: Option<String>,

    /// Thinking token budget.
    #[arrrg(optional, "Thinking token budget, 0 disables (default: 0)", "TOKENS")]
    thinking_budget: Option<u32>,

    /// Echo the request and response JSON to stderr.
    #[arrrg(flag, "Print the request and response JSON to stderr")]
    verbose: bool,
}

/// Writes API traffic to stderr.
struct StderrLogger;

impl ClientLogger for StderrLogger {
    fn log_request(&self, model: &str, request: &GenerateContentRequest) {
        match serde_json::to_string_pretty(request) {
            Ok(json) => eprintln!("--> {model}\n{json}"),
            Err(err) => eprintln!("--> {model} (unprintable request: {err})"),
        }
    }

    fn log_response(&self, response: &GenerateContentResponse) {
        match serde_json::to_string_pretty(response) {
            Ok(json) => eprintln!("<--\n{json}"),
            Err(err) => eprintln!("<-- (unprintable response: {err})"),
        }
    }

    fn log_stream_chunk(&self, chunk: &GenerateContentResponse) {
        self.log_response(chunk);
    }
}

/// Main entry point for the spark-prompt command-line tool.
///
/// Positional arguments are joined into the prompt.
///
/// # Errors
///
/// Returns an error if:
/// - No API key is set in the environment
/// - The API call fails
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, words) = Args::from_command_line_relaxed("spark-prompt [OPTIONS] [PROMPT]...");

    let prompt = if words.is_empty() {
        DEFAULT_PROMPT.to_string()
    } else {
        words.join(" ")
    };
    let model = args.model.map(Model::from).unwrap_or_default();
    let thinking = ThinkingConfig::from_budget(args.thinking_budget.unwrap_or(0));

    let mut client = Gemini::new(None)?;
    if args.verbose {
        client = client.with_logger(Arc::new(StderrLogger));
    }
    let request = GenerateContentRequest::new(vec![Content::user(prompt)]).with_thinking(thinking);
    let response = client.generate(&model, &request).await?;
    println!("{}", response.text());

    Ok(())
}
