//! Process-wide configuration for the edit adapter.

use crate::error::{EditError, Result};
use std::time::Duration;

/// Default Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables consulted for the API key, in order.
const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GOOGLE_API_KEY"];
const MODEL_ENV_VAR: &str = "RESTYLE_MODEL";
const BASE_URL_ENV_VAR: &str = "RESTYLE_BASE_URL";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
}

impl EditModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "gemini-3-pro-image-preview",
        }
    }
}

impl std::fmt::Display for EditModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved configuration, built once at startup and handed to
/// [`EditAdapter::new`](crate::EditAdapter::new).
#[derive(Clone)]
pub struct Config {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl Config {
    /// Creates a new `ConfigBuilder`.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Builds configuration purely from the environment.
    pub fn from_env() -> Result<Self> {
        ConfigBuilder::new().build()
    }

    /// The API key sent with every request.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Target model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Base URL of the generation API, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Optional per-request timeout. `None` means no local timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `API_KEY`, then `GOOGLE_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets a known model variant.
    pub fn model(mut self, model: EditModel) -> Self {
        self.model = Some(model.as_str().to_string());
        self
    }

    /// Sets an arbitrary model identifier. Falls back to `RESTYLE_MODEL`.
    pub fn model_id(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the API base URL. Falls back to `RESTYLE_BASE_URL`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration, resolving unset values from the environment.
    pub fn build(self) -> Result<Config> {
        self.build_with(|name| std::env::var(name).ok())
    }

    fn build_with(self, env: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let api_key = self
            .api_key
            .or_else(|| API_KEY_ENV_VARS.iter().find_map(|name| env(name)))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                EditError::Configuration(
                    "API_KEY (or GOOGLE_API_KEY) not set and no API key provided".into(),
                )
            })?;

        let model = self
            .model
            .or_else(|| env(MODEL_ENV_VAR))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| EditModel::default().as_str().to_string());

        let base_url = self
            .base_url
            .or_else(|| env(BASE_URL_ENV_VAR))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            api_key,
            model,
            base_url,
            timeout: self.timeout,
        })
    }
}
