//! Logging trait for Gemini client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all API interactions passing through the [`Gemini`](crate::Gemini) client.

use crate::{GenerateContentRequest, GenerateContentResponse};

/// A trait for logging Gemini client operations.
///
/// Implement this trait to record API interactions, including both blocking
/// responses and individual streamed chunks.
///
/// # Example
///
/// ```rust,ignore
/// use sparkchat::{ClientLogger, GenerateContentRequest, GenerateContentResponse};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, model: &str, request: &GenerateContentRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{model}: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, response: &GenerateContentResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
///
///     fn log_stream_chunk(&self, chunk: &GenerateContentResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Chunk: {}", serde_json::to_string(chunk).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log an outgoing request, blocking or streamed.
    fn log_request(&self, model: &str, request: &GenerateContentRequest);

    /// Log a complete response from a blocking `generate` call.
    fn log_response(&self, response: &GenerateContentResponse);

    /// Log one chunk of a streamed response.
    fn log_stream_chunk(&self, chunk: &GenerateContentResponse);
}
