//! Core types for image editing.

use crate::error::{EditError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// MIME type assumed when the model omits one.
pub const DEFAULT_RESULT_MIME_TYPE: &str = "image/png";

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
    /// HEIC format (HEVC-coded HEIF).
    Heic,
    /// HEIF container.
    Heif,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Heic => "heic",
            Self::Heif => "heif",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Heic => "image/heic",
            Self::Heif => "image/heif",
        }
    }

    /// Parses a MIME type, ignoring case and parameters.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            "image/heic" => Some(Self::Heic),
            "image/heif" => Some(Self::Heif),
            _ => None,
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "heic" => Some(Self::Heic),
            "heif" => Some(Self::Heif),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        // ISO-BMFF: ....ftyp<brand>
        if &data[4..8] == b"ftyp" {
            return match &data[8..12] {
                b"heic" | b"heix" | b"hevc" | b"hevx" => Some(Self::Heic),
                b"mif1" | b"msf1" => Some(Self::Heif),
                _ => None,
            };
        }

        None
    }
}

/// Strips a leading `data:image/<subtype>;base64,` header, if any.
///
/// Only lowercase alphabetic subtypes are recognized; anything else is
/// returned unchanged.
pub fn strip_data_uri_prefix(data: &str) -> &str {
    let Some(rest) = data.strip_prefix("data:image/") else {
        return data;
    };
    let Some((subtype, payload)) = rest.split_once(";base64,") else {
        return data;
    };
    if !subtype.is_empty() && subtype.bytes().all(|b| b.is_ascii_lowercase()) {
        payload
    } else {
        data
    }
}

/// Wraps base64 data in a `data:` URI for the given MIME type.
pub fn to_data_uri(mime_type: &str, base64_data: &str) -> String {
    format!("data:{mime_type};base64,{base64_data}")
}

/// An image supplied by the user, with its client-asserted content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    data: String,
    content_type: String,
}

impl ImagePayload {
    /// Creates a payload from base64 text, optionally data-URI wrapped.
    pub fn new(data: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    /// Creates a payload from raw image bytes.
    pub fn from_bytes(bytes: &[u8], content_type: impl Into<String>) -> Self {
        Self::new(
            base64::engine::general_purpose::STANDARD.encode(bytes),
            content_type,
        )
    }

    /// Creates a payload from a `data:<mime>;base64,<data>` URI, taking the
    /// content type from the header. Only the data after the header is kept.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let (header, data) = uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| EditError::InvalidInput("not a data URI".into()))?;
        let content_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| EditError::InvalidInput("data URI is not base64-encoded".into()))?;
        Ok(Self::new(data, content_type))
    }

    /// Reads an image file. The content type comes from the extension, or
    /// from the file's magic bytes when the extension is unknown.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .or_else(|| ImageFormat::from_magic_bytes(&bytes))
            .ok_or_else(|| {
                EditError::InvalidInput(format!(
                    "cannot determine image type of {}",
                    path.display()
                ))
            })?;
        Ok(Self::from_bytes(&bytes, format.mime_type()))
    }

    /// The data as supplied, possibly data-URI wrapped.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// The data with any data-URI header removed.
    pub fn base64_data(&self) -> &str {
        strip_data_uri_prefix(&self.data)
    }

    /// The declared content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns true if there is no image data.
    pub fn is_empty(&self) -> bool {
        self.base64_data().trim().is_empty()
    }

    pub(crate) fn validate(&self, role: &str) -> Result<()> {
        if self.is_empty() {
            return Err(EditError::InvalidInput(format!("{role} image is empty")));
        }
        if self.base64_data().starts_with("data:") {
            return Err(EditError::InvalidInput(format!(
                "{role} image has an unrecognized data URI header"
            )));
        }
        if ImageFormat::from_mime_type(&self.content_type).is_none() {
            return Err(EditError::InvalidInput(format!(
                "{role} image has unsupported content type '{}'",
                self.content_type
            )));
        }
        Ok(())
    }
}

/// A single edit submission.
#[derive(Debug, Clone)]
pub struct EditRequest {
    source: ImagePayload,
    reference: Option<ImagePayload>,
    instruction: String,
}

impl EditRequest {
    /// Creates a request to edit `source` according to `instruction`.
    pub fn new(source: ImagePayload, instruction: impl Into<String>) -> Self {
        Self {
            source,
            reference: None,
            instruction: instruction.into(),
        }
    }

    /// Adds a reference image (style or object reference).
    pub fn with_reference(mut self, reference: ImagePayload) -> Self {
        self.reference = Some(reference);
        self
    }

    /// The image to edit.
    pub fn source(&self) -> &ImagePayload {
        &self.source
    }

    /// The optional reference image.
    pub fn reference(&self) -> Option<&ImagePayload> {
        self.reference.as_ref()
    }

    /// The natural-language edit instruction.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Checks the request can be sent.
    pub fn validate(&self) -> Result<()> {
        if self.instruction.trim().is_empty() {
            return Err(EditError::InvalidInput("instruction must not be blank".into()));
        }
        self.source.validate("source")?;
        if let Some(ref reference) = self.reference {
            reference.validate("reference")?;
        }
        Ok(())
    }
}

/// The edited image, ready to embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "edit result should be displayed or saved"]
pub struct EditResult {
    /// The image as a `data:` URI.
    pub image_data: String,
    /// MIME type of the image.
    pub mime_type: String,
}

impl EditResult {
    /// Builds a result from base64 image data and its MIME type.
    pub fn new(mime_type: impl Into<String>, base64_data: &str) -> Self {
        let mime_type = mime_type.into();
        Self {
            image_data: to_data_uri(&mime_type, base64_data),
            mime_type,
        }
    }

    /// The base64 payload without the `data:` header.
    pub fn base64_data(&self) -> &str {
        self.image_data
            .split_once(";base64,")
            .map(|(_, data)| data)
            .unwrap_or(&self.image_data)
    }

    /// Decodes the image to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.base64_data())
            .map_err(|e| EditError::Decode(e.to_string()))
    }

    /// Image format, if the MIME type is a recognized one.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Decodes the image and writes it to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.decode()?)?;
        Ok(())
    }
}

/// A past edit, kept for a future history view.
///
/// Nothing in the crate stores or loads these yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Unique identifier.
    pub id: String,
    /// Source image as a data URI.
    pub original_image: String,
    /// The instruction that produced the result.
    pub prompt: String,
    /// Edited image as a data URI.
    pub result_image: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl HistoryItem {
    /// Records a completed edit.
    pub fn from_edit(
        id: impl Into<String>,
        request: &EditRequest,
        result: &EditResult,
        timestamp: u64,
    ) -> Self {
        let source = request.source();
        Self {
            id: id.into(),
            original_image: to_data_uri(source.content_type(), source.base64_data()),
            prompt: request.instruction().to_string(),
            result_image: result.image_data.clone(),
            timestamp,
        }
    }
}
