//! The network seam between the adapter and the generation API.

use crate::config::Config;
use crate::edit::wire::{GenerateContentRequest, GenerateContentResponse};
use crate::error::{sanitize_error_message, EditError, Result};
use async_trait::async_trait;

/// Something that can answer a `generateContent` call.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Sends one request to `model` and returns the decoded response.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    /// Checks that `model` exists and the credential is accepted.
    async fn check_model(&self, model: &str) -> Result<()>;
}

/// [`ContentGenerator`] backed by the Gemini REST API.
pub struct HttpGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HttpGenerator {
    /// Creates a generator from resolved configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key().to_string(),
            base_url: config.base_url().to_string(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}", self.base_url, model)
    }

    fn parse_error(&self, status: u16, text: &str) -> EditError {
        EditError::Api {
            status,
            message: sanitize_error_message(text, &self.api_key),
        }
    }
}

#[async_trait]
impl ContentGenerator for HttpGenerator {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}:generateContent", self.model_url(model));

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn check_model(&self, model: &str) -> Result<()> {
        let response = self
            .client
            .get(self.model_url(model))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(EditError::Configuration(format!(
                "API key rejected: {}",
                sanitize_error_message(&text, &self.api_key)
            ))),
            404 => Err(EditError::Configuration(format!(
                "model '{model}' not found"
            ))),
            s => Err(self.parse_error(s, &text)),
        }
    }
}
