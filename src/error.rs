//! Error types for image editing.

/// Maximum length of a provider error message carried in [`EditError::Api`].
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while editing an image.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Credential or other startup configuration missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Request rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The model answered but produced no content at all.
    #[error("No content generated from the model.{}", detail_suffix(.detail))]
    NoContent {
        /// Block or finish reason reported alongside the empty response.
        detail: Option<String>,
    },

    /// The model produced content but none of it was an image.
    #[error(
        "The model did not return an image. It might have refused the request due to safety or validity."
    )]
    NoImageProduced {
        /// Text the model returned instead of an image.
        model_text: Option<String>,
    },

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized error message from the response body.
        message: String,
    },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading an input image or saving a result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

/// Broad classification of an [`EditError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid configuration.
    Configuration,
    /// Caller-supplied input was rejected.
    InvalidInput,
    /// Empty model response.
    NoContent,
    /// Model response without any image.
    NoImageProduced,
    /// The network call itself failed.
    Transport,
    /// Local file or decoding failure outside the network call.
    Local,
}

impl EditError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NoContent { .. } => ErrorKind::NoContent,
            Self::NoImageProduced { .. } => ErrorKind::NoImageProduced,
            Self::Api { .. } | Self::Network(_) | Self::Json(_) => ErrorKind::Transport,
            Self::Decode(_) | Self::Io(_) => ErrorKind::Local,
        }
    }

    /// Returns true if the network call itself failed.
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

/// Result type alias for image editing operations.
pub type Result<T> = std::result::Result<T, EditError>;

/// Cleans up a provider error body for display.
///
/// Pulls `error.message` out of Google's JSON error envelope when present,
/// redacts the API key if the provider echoed it back, and truncates.
pub(crate) fn sanitize_error_message(text: &str, api_key: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| text.trim().to_string());

    let message = if api_key.is_empty() {
        message
    } else {
        message.replace(api_key, "[REDACTED]")
    };

    if message.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = message.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        message
    }
}
