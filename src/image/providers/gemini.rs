//! Gemini (Google) image generation provider.
//!
//! Two API surfaces can return an image: the dedicated images endpoint and
//! the general content endpoint asked to reply with inline data. The model
//! identifier decides which goes first; the other is tried exactly once on
//! failure.

use crate::error::{NewswallError, Result};
use crate::fallback::first_success;
use crate::image::journal::{AttemptRecord, AttemptSink};
use crate::image::provider::ImageProvider;
use crate::image::types::ImageRequest;
use async_trait::async_trait;
use base64::Engine;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Known locations of the base64 payload in images endpoint responses,
/// probed in order; the first non-empty string wins. This list is part of
/// the adapter's contract.
const IMAGES_PAYLOAD_PATHS: [&str; 3] = [
    "/images/0/data/b64",
    "/images/0/b64",
    "/candidates/0/image/b64",
];

/// Which API surface an attempt targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    /// `v1beta/images:generate`
    Images,
    /// `v1beta/models/{model}:generateContent`
    Content,
}

impl Endpoint {
    fn label(&self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Content => "content",
        }
    }
}

fn image_capable(model: &str) -> bool {
    model.contains("image") || model.contains("preview")
}

fn conversational(model: &str) -> bool {
    model.starts_with("gemini-") || model.starts_with("gemini:") || model.contains("gemini")
}

/// Builder for GeminiProvider.
#[derive(Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    journal: Option<(Arc<dyn AttemptSink>, String)>,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GEMINI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier. Falls back to `GEMINI_MODEL` env var.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Records every endpoint attempt to `sink`, tagged with `source`
    /// (e.g. "auto" for scheduled runs, "manual" otherwise).
    pub fn journal(mut self, sink: Arc<dyn AttemptSink>, source: impl Into<String>) -> Self {
        self.journal = Some((sink, source.into()));
        self
    }

    /// Builds the provider. Credentials are checked per call, not here,
    /// so an unconfigured provider fails fast in `generate`.
    pub fn build(self) -> GeminiProvider {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .unwrap_or_default();
        let model = self
            .model
            .or_else(|| std::env::var("GEMINI_MODEL").ok())
            .unwrap_or_default();

        GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            journal: self.journal,
        }
    }
}

/// Gemini image generation provider with an in-call endpoint fallback.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    journal: Option<(Arc<dyn AttemptSink>, String)>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// Endpoint trial order for the configured model.
    ///
    /// Image-capable identifiers (containing "image" or "preview") beat the
    /// conversational family check: a model matching both goes to the
    /// images endpoint first. Unknown identifiers also start there.
    fn endpoint_order(&self) -> [Endpoint; 2] {
        let model = self.model.to_lowercase();
        if image_capable(&model) {
            [Endpoint::Images, Endpoint::Content]
        } else if conversational(&model) {
            [Endpoint::Content, Endpoint::Images]
        } else {
            [Endpoint::Images, Endpoint::Content]
        }
    }

    async fn generate_impl(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        if self.api_key.is_empty() {
            return Err(NewswallError::MissingApiKey("gemini".into()));
        }
        if self.model.is_empty() {
            return Err(NewswallError::MissingModel("gemini".into()));
        }

        let endpoints = self.endpoint_order();
        tracing::debug!(
            model = %self.model,
            first = endpoints[0].label(),
            "selected endpoint order"
        );

        let outcome = first_success(
            &endpoints,
            |endpoint| endpoint.label().to_string(),
            |endpoint| self.attempt(*endpoint, request).boxed(),
        )
        .await;

        match outcome {
            Ok((endpoint, data)) => {
                tracing::debug!(endpoint = %endpoint, bytes = data.len(), "image generated");
                Ok(data)
            }
            Err(causes) => {
                let mut causes = causes.into_iter().map(|(_, cause)| cause);
                match (causes.next(), causes.next()) {
                    (Some(primary), Some(fallback)) => Err(NewswallError::GenerationFailed {
                        primary: Box::new(primary),
                        fallback: Box::new(fallback),
                    }),
                    (Some(single), None) => Err(single),
                    (None, _) => Err(NewswallError::MissingImageData),
                }
            }
        }
    }

    async fn attempt(&self, endpoint: Endpoint, request: &ImageRequest) -> Result<Vec<u8>> {
        self.record_attempt(endpoint, request);
        match endpoint {
            Endpoint::Images => self.generate_via_images(request).await,
            Endpoint::Content => self.generate_via_content(request).await,
        }
    }

    /// Journals one attempt. Always happens before the network call, so
    /// the log shows attempts that never got a response; write failures
    /// are swallowed.
    fn record_attempt(&self, endpoint: Endpoint, request: &ImageRequest) {
        let Some((sink, source)) = &self.journal else {
            return;
        };
        let record = AttemptRecord::new(
            endpoint.label(),
            &self.model,
            request.resolution(),
            &request.prompt,
            source.clone(),
        );
        if let Err(e) = sink.append(&record) {
            tracing::debug!("attempt log write failed: {e}");
        }
    }

    async fn generate_via_images(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        let url = format!("{}/v1beta/images:generate", self.base_url);
        let body = ImagesRequest {
            model: self.model.clone(),
            prompt: ImagesPrompt {
                text: request.prompt.clone(),
            },
            size: request.resolution(),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
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

        let payload: serde_json::Value = response.json().await?;
        let b64 = IMAGES_PAYLOAD_PATHS
            .iter()
            .find_map(|path| {
                payload
                    .pointer(path)
                    .and_then(serde_json::Value::as_str)
                    .filter(|data| !data.is_empty())
            })
            .ok_or(NewswallError::MissingImageData)?;

        base64::engine::general_purpose::STANDARD
            .decode(b64)
            .map_err(|e| NewswallError::Decode(e.to_string()))
    }

    async fn generate_via_content(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = ContentRequest::for_wallpaper(request);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
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

        let payload: ContentResponse = response.json().await?;
        let inline = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .find_map(|part| part.inline_data.filter(|inline| !inline.data.is_empty()))
            .ok_or(NewswallError::MissingInlineData)?;

        base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| NewswallError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        self.generate_impl(request).await
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
struct ImagesRequest {
    model: String,
    prompt: ImagesPrompt,
    size: String,
}

#[derive(Debug, Serialize)]
struct ImagesPrompt {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest {
    contents: Vec<ContentTurn>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ContentTurn {
    role: String,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

impl ContentRequest {
    fn for_wallpaper(request: &ImageRequest) -> Self {
        let text = format!(
            "{}\n\nGenerate a {}x{} PNG wallpaper. Return only the image as inline data.",
            request.prompt, request.width, request.height
        );
        Self {
            contents: vec![ContentTurn {
                role: "user".into(),
                parts: vec![TextPart { text }],
            }],
            generation_config: GenerationConfig { temperature: 0.8 },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

/// Both payload spellings occur in the wild, so accept either.
#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(rename = "inlineData", alias = "inline_data", default)]
    inline_data: Option<InlinePayload>,
}

#[derive(Debug, Deserialize)]
struct InlinePayload {
    #[serde(default)]
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::journal::MemorySink;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_b64() -> String {
        base64::engine::general_purpose::STANDARD.encode(PNG)
    }

    fn provider(server: &MockServer, model: &str) -> GeminiProvider {
        GeminiProvider::builder()
            .api_key("test-key")
            .model(model)
            .base_url(server.uri())
            .build()
    }

    #[test]
    fn test_endpoint_order_heuristic() {
        let order = |model: &str| {
            GeminiProvider::builder()
                .api_key("k")
                .model(model)
                .build()
                .endpoint_order()
        };

        // image-capable identifiers go to the images endpoint first
        assert_eq!(
            order("gemini-2.5-flash-image"),
            [Endpoint::Images, Endpoint::Content]
        );
        assert_eq!(
            order("nano-banana-pro-preview"),
            [Endpoint::Images, Endpoint::Content]
        );
        assert_eq!(order("Imagen-3"), [Endpoint::Images, Endpoint::Content]);

        // conversational family without image capability starts on content
        assert_eq!(
            order("gemini-1.5-pro"),
            [Endpoint::Content, Endpoint::Images]
        );
        assert_eq!(
            order("GEMINI-2.0-FLASH"),
            [Endpoint::Content, Endpoint::Images]
        );
        assert_eq!(
            order("tuned:gemini-pro"),
            [Endpoint::Content, Endpoint::Images]
        );

        // anything else defaults to the images endpoint
        assert_eq!(order("mystery-model"), [Endpoint::Images, Endpoint::Content]);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let sink = Arc::new(MemorySink::new());
        let provider = GeminiProvider::builder()
            .api_key("")
            .model("gemini-2.5-flash-image")
            .journal(sink.clone(), "manual")
            .build();

        let err = provider
            .generate(&ImageRequest::new("p"))
            .await
            .unwrap_err();
        assert!(matches!(err, NewswallError::MissingApiKey(_)));
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn test_missing_model_fails_before_any_request() {
        let provider = GeminiProvider::builder().api_key("k").model("").build();

        let err = provider
            .generate(&ImageRequest::new("p"))
            .await
            .unwrap_err();
        assert!(matches!(err, NewswallError::MissingModel(_)));
    }

    #[tokio::test]
    async fn test_image_capable_model_hits_images_endpoint_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/images:generate"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "images": [{ "data": { "b64": png_b64() } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server, "gemini-2.5-flash-image");
        let request = ImageRequest::new("a quiet harbor at dawn");
        let data = provider.generate(&request).await.unwrap();
        assert_eq!(data, PNG);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "gemini-2.5-flash-image");
        assert_eq!(body["prompt"]["text"], "a quiet harbor at dawn");
        assert_eq!(body["size"], "2560x1440");
    }

    #[tokio::test]
    async fn test_images_payload_probed_in_order_skipping_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/images:generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "images": [{ "data": { "b64": "" }, "b64": png_b64() }]
            })))
            .mount(&server)
            .await;

        let provider = provider(&server, "gemini-2.5-flash-image");
        let data = provider.generate(&ImageRequest::new("p")).await.unwrap();
        assert_eq!(data, PNG);
    }

    #[tokio::test]
    async fn test_conversational_model_hits_content_endpoint_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            { "text": "here is your wallpaper" },
                            { "inlineData": { "mimeType": "image/png", "data": png_b64() } }
                        ]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server, "gemini-1.5-pro");
        let request = ImageRequest::new("a quiet harbor at dawn").with_size(1920, 1080);
        let data = provider.generate(&request).await.unwrap();
        assert_eq!(data, PNG);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("a quiet harbor at dawn"));
        assert!(text.ends_with(
            "Generate a 1920x1080 PNG wallpaper. Return only the image as inline data."
        ));
        assert_eq!(body["generationConfig"]["temperature"], 0.8);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_other_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/images:generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash-image:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{ "inlineData": { "mimeType": "image/png", "data": png_b64() } }]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sink = Arc::new(MemorySink::new());
        let provider = GeminiProvider::builder()
            .api_key("test-key")
            .model("gemini-2.5-flash-image")
            .base_url(server.uri())
            .journal(sink.clone(), "auto")
            .build();

        let data = provider.generate(&ImageRequest::new("p")).await.unwrap();
        assert_eq!(data, PNG);

        // one journal entry per endpoint attempt, in trial order
        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].endpoint, "images");
        assert_eq!(records[1].endpoint, "content");
        assert_eq!(records[0].source, "auto");
        assert_eq!(records[0].resolution, "2560x1440");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.path().ends_with("images:generate"));
        assert!(requests[1].url.path().ends_with(":generateContent"));
    }

    #[tokio::test]
    async fn test_both_endpoints_failing_surfaces_both_causes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/images:generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "images": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash-image:generateContent"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = provider(&server, "gemini-2.5-flash-image");
        let err = provider
            .generate(&ImageRequest::new("p"))
            .await
            .unwrap_err();

        match err {
            NewswallError::GenerationFailed { primary, fallback } => {
                assert!(matches!(*primary, NewswallError::MissingImageData));
                assert!(matches!(
                    *fallback,
                    NewswallError::Api { status: 503, .. }
                ));
            }
            other => panic!("expected GenerationFailed, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_failing_sink_never_affects_generation() {
        #[derive(Debug)]
        struct FailingSink;
        impl AttemptSink for FailingSink {
            fn append(&self, _: &AttemptRecord) -> std::io::Result<()> {
                Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                ))
            }
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/images:generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "images": [{ "data": { "b64": png_b64() } }]
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::builder()
            .api_key("test-key")
            .model("gemini-2.5-flash-image")
            .base_url(server.uri())
            .journal(Arc::new(FailingSink), "manual")
            .build();

        let data = provider.generate(&ImageRequest::new("p")).await.unwrap();
        assert_eq!(data, PNG);
    }

    #[test]
    fn test_content_response_accepts_both_inline_spellings() {
        let camel = r#"{
            "candidates": [{
                "content": {
                    "parts": [{ "inlineData": { "data": "aGk=" } }]
                }
            }]
        }"#;
        let resp: ContentResponse = serde_json::from_str(camel).unwrap();
        let part = &resp.candidates[0].content.as_ref().unwrap().parts[0];
        assert_eq!(part.inline_data.as_ref().unwrap().data, "aGk=");

        let snake = r#"{
            "candidates": [{
                "content": {
                    "parts": [{ "inline_data": { "data": "aGk=" } }]
                }
            }]
        }"#;
        let resp: ContentResponse = serde_json::from_str(snake).unwrap();
        let part = &resp.candidates[0].content.as_ref().unwrap().parts[0];
        assert_eq!(part.inline_data.as_ref().unwrap().data, "aGk=");
    }

    #[tokio::test]
    async fn test_content_without_inline_part_is_missing_inline_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "cannot draw that" }] }
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/images:generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such api"))
            .mount(&server)
            .await;

        let provider = provider(&server, "gemini-1.5-pro");
        let err = provider
            .generate(&ImageRequest::new("p"))
            .await
            .unwrap_err();

        match err {
            NewswallError::GenerationFailed { primary, fallback } => {
                assert!(matches!(*primary, NewswallError::MissingInlineData));
                assert!(matches!(*fallback, NewswallError::Api { status: 404, .. }));
            }
            other => panic!("expected GenerationFailed, got {other}"),
        }
    }
}
