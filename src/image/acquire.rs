//! Acquisition orchestrator: one generation attempt, then the stock chain.

use crate::error::Result;
use crate::image::provider::ImageProvider;
use crate::image::stock::StockChain;
use crate::image::types::{AcquiredImage, ImageOrigin, ImageRequest};

/// Runs the acquisition pipeline for one request.
///
/// A configured generator gets exactly one attempt; its failure is
/// logged, never fatal. The stock chain is the safety net, and only its
/// failure fails the run.
pub struct AcquisitionPipeline {
    generator: Option<Box<dyn ImageProvider>>,
    stock: StockChain,
}

impl AcquisitionPipeline {
    /// Creates a pipeline with no generator and the default stock chain.
    pub fn new() -> Self {
        Self {
            generator: None,
            stock: StockChain::new(),
        }
    }

    /// Sets the generative provider tried before the stock chain.
    pub fn with_generator(mut self, generator: Box<dyn ImageProvider>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Replaces the stock chain.
    pub fn with_stock(mut self, stock: StockChain) -> Self {
        self.stock = stock;
        self
    }

    /// Acquires one image for the request.
    pub async fn acquire(&self, request: &ImageRequest) -> Result<AcquiredImage> {
        if let Some(generator) = &self.generator {
            tracing::info!(
                provider = generator.name(),
                model = generator.model(),
                "generating image"
            );
            match generator.generate(request).await {
                Ok(data) => {
                    return Ok(AcquiredImage::new(
                        data,
                        ImageOrigin::Generated {
                            provider: generator.name().to_string(),
                            model: generator.model().to_string(),
                        },
                    ));
                }
                Err(e) => {
                    tracing::warn!(
                        provider = generator.name(),
                        "generation failed, falling back to stock: {e}"
                    );
                }
            }
        }

        let stock = self
            .stock
            .fetch(&request.keywords, request.width, request.height)
            .await?;
        Ok(AcquiredImage::new(
            stock.data,
            ImageOrigin::Stock {
                source: stock.source,
            },
        ))
    }
}

impl Default for AcquisitionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NewswallError;
    use crate::image::stock::StockSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATED: &[u8] = b"generated-bytes";
    const STOCK: &[u8] = b"stock-bytes";

    struct ScriptedProvider {
        data: Option<Vec<u8>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        fn succeeding(calls: Arc<AtomicUsize>) -> Self {
            Self {
                data: Some(GENERATED.to_vec()),
                calls,
            }
        }

        fn failing(calls: Arc<AtomicUsize>) -> Self {
            Self { data: None, calls }
        }
    }

    #[async_trait]
    impl ImageProvider for ScriptedProvider {
        async fn generate(&self, _request: &ImageRequest) -> crate::error::Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.data {
                Some(data) => Ok(data.clone()),
                None => Err(NewswallError::MissingImageData),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    fn stock_chain(server: &MockServer) -> StockChain {
        StockChain::new().with_sources(vec![StockSource::new(
            "mock",
            format!("{}/stock", server.uri()),
        )])
    }

    #[tokio::test]
    async fn test_generation_success_never_touches_stock() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicUsize::new(0));

        let pipeline = AcquisitionPipeline::new()
            .with_generator(Box::new(ScriptedProvider::succeeding(calls.clone())))
            .with_stock(stock_chain(&server));

        let image = pipeline.acquire(&ImageRequest::new("p")).await.unwrap();

        assert_eq!(image.data, GENERATED);
        assert_eq!(
            image.origin,
            ImageOrigin::Generated {
                provider: "scripted".into(),
                model: "scripted-model".into(),
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_falls_back_to_stock() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(STOCK.to_vec()))
            .mount(&server)
            .await;
        let calls = Arc::new(AtomicUsize::new(0));

        let pipeline = AcquisitionPipeline::new()
            .with_generator(Box::new(ScriptedProvider::failing(calls.clone())))
            .with_stock(stock_chain(&server));

        let image = pipeline.acquire(&ImageRequest::new("p")).await.unwrap();

        assert_eq!(image.data, STOCK);
        assert_eq!(
            image.origin,
            ImageOrigin::Stock {
                source: "mock".into()
            }
        );
        // the generator is never retried
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_without_generator_stock_is_used_directly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(STOCK.to_vec()))
            .mount(&server)
            .await;

        let pipeline = AcquisitionPipeline::new().with_stock(stock_chain(&server));
        let image = pipeline.acquire(&ImageRequest::new("p")).await.unwrap();

        assert_eq!(
            image.origin,
            ImageOrigin::Stock {
                source: "mock".into()
            }
        );
    }

    #[tokio::test]
    async fn test_total_failure_surfaces_the_stock_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let calls = Arc::new(AtomicUsize::new(0));

        let pipeline = AcquisitionPipeline::new()
            .with_generator(Box::new(ScriptedProvider::failing(calls.clone())))
            .with_stock(stock_chain(&server));

        let err = pipeline.acquire(&ImageRequest::new("p")).await.unwrap_err();

        // the run's error is the chain's aggregate, not the generation failure
        match err {
            NewswallError::StockExhausted { causes } => {
                assert_eq!(causes.len(), 1);
                assert_eq!(causes[0].0, "mock");
            }
            other => panic!("expected StockExhausted, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_identical_requests_yield_identical_bytes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = AcquisitionPipeline::new()
            .with_generator(Box::new(ScriptedProvider::succeeding(calls)));

        let request = ImageRequest::new("same prompt").with_size(640, 480);
        let first = pipeline.acquire(&request).await.unwrap();
        let second = pipeline.acquire(&request).await.unwrap();

        assert_eq!(first.data, second.data);
        assert_eq!(first.origin, second.origin);
    }
}
