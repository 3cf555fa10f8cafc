use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Supported image media types
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageMediaType {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageMediaType {
    /// The MIME type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Png => "image/png",
            ImageMediaType::Gif => "image/gif",
            ImageMediaType::Webp => "image/webp",
        }
    }

    /// Guess the media type from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMediaType::Jpeg),
            "png" => Some(ImageMediaType::Png),
            "gif" => Some(ImageMediaType::Gif),
            "webp" => Some(ImageMediaType::Webp),
            _ => None,
        }
    }
}

/// Uploaded content included in the next outgoing request only.
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// Decoded text of a text or JSON context file.
    Text(String),

    /// Raw image bytes, forwarded to the model undecoded.
    Image {
        /// The file contents.
        bytes: Vec<u8>,
        /// The image type.
        media_type: ImageMediaType,
    },
}

impl Attachment {
    /// Load an attachment from disk.
    ///
    /// Image extensions (jpeg, png, gif, webp) produce an image attachment;
    /// anything else must be valid UTF-8 and is attached as text.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;

        let image_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageMediaType::from_extension);
        if let Some(media_type) = image_type {
            return Ok(Attachment::Image { bytes, media_type });
        }

        let text = String::from_utf8(bytes).map_err(|err| {
            Error::encoding(
                format!("{} is neither an image nor UTF-8 text", path.display()),
                Some(Box::new(err)),
            )
        })?;
        Ok(Attachment::Text(text))
    }

    /// The decoded text, if this is a text attachment.
    pub fn text(&self) -> Option<&str> {
        match self {
            Attachment::Text(text) => Some(text),
            Attachment::Image { .. } => None,
        }
    }

    /// Returns true for image attachments.
    pub fn is_image(&self) -> bool {
        matches!(self, Attachment::Image { .. })
    }

    /// A short human-readable description for status output.
    pub fn describe(&self) -> String {
        match self {
            Attachment::Text(text) => format!("text ({} chars)", text.chars().count()),
            Attachment::Image { bytes, media_type } => {
                format!("{} ({} bytes)", media_type.as_str(), bytes.len())
            }
        }
    }
}
