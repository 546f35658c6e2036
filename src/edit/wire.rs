//! Gemini `generateContent` wire types.

use serde::{Deserialize, Serialize};

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; edits always send exactly one.
    pub contents: Vec<Content>,
    /// Output settings.
    pub generation_config: GenerationConfig,
}

/// One turn of request content.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    /// Ordered request segments.
    pub parts: Vec<RequestSegment>,
}

/// A request segment: inline image data or text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestSegment {
    /// Base64 image bytes with their content type.
    #[serde(rename_all = "camelCase")]
    InlineData {
        /// The image payload.
        inline_data: InlineData,
    },
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
}

impl RequestSegment {
    /// Creates an inline image segment.
    pub fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    /// Creates a text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Inline binary data sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Declared content type.
    pub mime_type: String,
    /// Base64 data without any data-URI header.
    pub data: String,
}

/// Output settings for image models.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested output modalities.
    pub response_modalities: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
        }
    }
}

/// Response of a `generateContent` call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate responses; only the first is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Present when the prompt itself was blocked.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One candidate response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content, absent when generation stopped early.
    #[serde(default)]
    pub content: Option<CandidateContent>,
    /// Why generation stopped (e.g. `STOP`, `IMAGE_SAFETY`).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    /// Response segments in model order.
    #[serde(default)]
    pub parts: Vec<ResponseSegment>,
}

/// Prompt-level block information.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Block reason code.
    #[serde(default)]
    pub block_reason: Option<String>,
    /// Human-readable block explanation.
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

/// A response segment.
///
/// Parts carrying neither text nor inline data (function calls, executable
/// code, bare thought signatures) decode as [`ResponseSegment::Other`], as
/// does inline data with no bytes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPart")]
pub enum ResponseSegment {
    /// Text commentary from the model.
    Text(String),
    /// Inline binary data.
    InlineBinary {
        /// Base64 data.
        data: String,
        /// Content type, when the model reports one.
        mime_type: Option<String>,
    },
    /// Any other kind of part.
    Other,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<RawInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

impl From<RawPart> for ResponseSegment {
    fn from(part: RawPart) -> Self {
        let inline_data = part.inline_data.filter(|inline| !inline.data.trim().is_empty());
        match (inline_data, part.text) {
            (Some(inline), _) => Self::InlineBinary {
                data: inline.data,
                mime_type: inline.mime_type.filter(|m| !m.trim().is_empty()),
            },
            (None, Some(text)) => Self::Text(text),
            (None, None) => Self::Other,
        }
    }
}
