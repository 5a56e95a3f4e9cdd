//! OpenAI image generation provider (gpt-image-1).

use crate::error::{NewswallError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::ImageRequest;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-image-1";

/// Builder for OpenAiImageProvider.
#[derive(Debug, Clone, Default)]
pub struct OpenAiImageProviderBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl OpenAiImageProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `OPENAI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier (default: "gpt-image-1").
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builds the provider. Credentials are checked per call, not here.
    pub fn build(self) -> OpenAiImageProvider {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_default();

        OpenAiImageProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// OpenAI image generation provider.
pub struct OpenAiImageProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiImageProvider {
    /// Creates a new `OpenAiImageProviderBuilder`.
    pub fn builder() -> OpenAiImageProviderBuilder {
        OpenAiImageProviderBuilder::new()
    }

    async fn generate_impl(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        if self.api_key.is_empty() {
            return Err(NewswallError::MissingApiKey("openai".into()));
        }
        if self.model.is_empty() {
            return Err(NewswallError::MissingModel("openai".into()));
        }

        let url = format!("{}/v1/images/generations", self.base_url);
        let body = GenerationsRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            size: request.resolution(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NewswallError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GenerationsResponse = response.json().await?;
        let b64 = payload
            .data
            .into_iter()
            .next()
            .and_then(|image| image.b64_json)
            .filter(|b64| !b64.is_empty())
            .ok_or(NewswallError::MissingImageData)?;

        base64::engine::general_purpose::STANDARD
            .decode(&b64)
            .map_err(|e| NewswallError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        self.generate_impl(request).await
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
struct GenerationsRequest {
    model: String,
    prompt: String,
    size: String,
}

#[derive(Debug, Deserialize)]
struct GenerationsResponse {
    #[serde(default)]
    data: Vec<GeneratedData>,
}

#[derive(Debug, Deserialize)]
struct GeneratedData {
    #[serde(default)]
    b64_json: Option<String>,
}
