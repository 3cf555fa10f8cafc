//! Transcript export and import.
//!
//! Two formats are written: a JSON array of `{role, content, ts?}` objects and
//! a flat `[role] content` text transcript. Only JSON can be read back.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde_json::{from_reader, to_writer_pretty};

use crate::error::{Error, Result};
use crate::types::Message;

/// Export file format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// JSON array of messages; can be imported again.
    #[default]
    Json,
    /// Human-readable text transcript.
    Text,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Text => write!(f, "text"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(format!(
                "Invalid export format: {s}. Valid options: json, text"
            )),
        }
    }
}

/// Serialize messages as a pretty-printed JSON array.
pub fn to_json(messages: &[Message]) -> Result<String> {
    Ok(serde_json::to_string_pretty(messages)?)
}

/// Render messages as `[role] content`, separated by blank lines.
pub fn to_text(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("[{}] {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parse a JSON array of messages.
///
/// Either every message parses or an error is returned; callers replace
/// history only on success.
pub fn from_json(text: &str) -> Result<Vec<Message>> {
    serde_json::from_str(text)
        .map_err(|err| Error::serialization("failed to parse chat import", Some(Box::new(err))))
}

/// Write messages to `path` in the given format.
pub fn export_to_path<P: AsRef<Path>>(
    messages: &[Message],
    format: ExportFormat,
    path: P,
) -> Result<()> {
    let file = File::create(path.as_ref())
        .map_err(|err| Error::io("failed to create export file", err))?;
    let mut writer = BufWriter::new(file);
    match format {
        ExportFormat::Json => to_writer_pretty(&mut writer, messages).map_err(|err| {
            Error::serialization("failed to serialize transcript", Some(Box::new(err)))
        })?,
        ExportFormat::Text => writer
            .write_all(to_text(messages).as_bytes())
            .map_err(|err| Error::io("failed to write export file", err))?,
    }
    writer
        .flush()
        .map_err(|err| Error::io("failed to write export file", err))
}

/// Read a JSON message array from `path`.
pub fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Message>> {
    let file =
        File::open(path.as_ref()).map_err(|err| Error::io("failed to open import file", err))?;
    let reader = BufReader::new(file);
    from_reader(reader)
        .map_err(|err| Error::serialization("failed to parse chat import", Some(Box::new(err))))
}
