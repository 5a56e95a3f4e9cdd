//! Chat-completion refinement of the draft wallpaper prompt.
//!
//! Refinement is optional everywhere: callers fall back to the draft
//! prompt when this client fails.

use crate::error::{NewswallError, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4.1";

const SYSTEM_PROMPT: &str = "You are an elite prompt writer for text-to-image models. \
    Task: craft ONE final imagery prompt for a desktop wallpaper. \
    Requirements: \
    - Be concise but evocative (1–3 sentences). \
    - Incorporate the supplied keywords/themes and time-of-day. \
    - Select 1–3 concrete subjects (people, places, or objects) from the themes/headlines \
    to feature prominently as focal points; compose the scene around them. \
    - Weave in the provided style/vibe and the randomly chosen art/photography style. \
    - Include a short, compact negative prompt at the end prefixed with \"Avoid:\". \
    - Do NOT include any other text, labels, or formatting. \
    Output ONLY the final prompt line.";

/// Inputs for one refinement call.
///
/// `selected_style` is drawn by the caller (uniformly from the configured
/// pool), so the client itself is deterministic.
#[derive(Debug, Clone, Default)]
pub struct RefineContext {
    /// Ranked headline keywords.
    pub keywords: Vec<String>,
    /// Raw headlines; at most eight samples go over the wire.
    pub headlines: Vec<String>,
    /// Time-of-day descriptor, e.g. "morning golden light".
    pub time_of_day: String,
    /// Configured base style.
    pub style: String,
    /// Configured vibe.
    pub vibe: String,
    /// Configured negative prompt clause.
    pub negative: String,
    /// Style drawn from the configured pool, empty when none.
    pub selected_style: String,
}

/// Builder for PromptRefiner.
#[derive(Debug, Clone, Default)]
pub struct PromptRefinerBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl PromptRefinerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `OPENAI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the chat model. Falls back to `OPENAI_MODEL`, then "gpt-4.1".
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builds the refiner. Credentials are checked per call, not here.
    pub fn build(self) -> PromptRefiner {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_default();
        let model = self
            .model
            .or_else(|| std::env::var("OPENAI_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        PromptRefiner {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// Chat-completion client that turns a context bag into one prompt line.
pub struct PromptRefiner {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl PromptRefiner {
    /// Creates a new `PromptRefinerBuilder`.
    pub fn builder() -> PromptRefinerBuilder {
        PromptRefinerBuilder::new()
    }

    /// Model identifier this refiner calls.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Produces the refined prompt line for the given context.
    pub async fn refine(&self, context: &RefineContext) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(NewswallError::MissingApiKey("openai".into()));
        }

        let payload = RefinePayload::from_context(context);
        let body = ChatRequest {
            model: self.model.clone(),
            temperature: 0.8,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: serde_json::to_string(&payload)?,
                },
            ],
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
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

        let payload: ChatResponse = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| NewswallError::UnexpectedResponse("empty refinement content".into()))
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefinePayload {
    time_of_day: String,
    keywords: Vec<String>,
    style: String,
    vibe: String,
    selected_style: String,
    negative: String,
    headline_samples: Vec<String>,
}

impl RefinePayload {
    fn from_context(context: &RefineContext) -> Self {
        Self {
            time_of_day: context.time_of_day.clone(),
            keywords: context.keywords.clone(),
            style: context.style.clone(),
            vibe: context.vibe.clone(),
            selected_style: context.selected_style.clone(),
            negative: context.negative.clone(),
            headline_samples: context.headlines.iter().take(8).cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}
