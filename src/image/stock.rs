//! Public stock-photo fallback chain.
//!
//! When generation is unavailable or fails, an ordered list of keyless
//! public sources is tried until one returns image bytes.

use crate::error::{NewswallError, Result};
use crate::fallback::first_success;
use futures::FutureExt;

/// One templated stock source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockSource {
    /// Short name used in provenance and error causes.
    pub name: String,
    /// URL template with `{width}`, `{height}`, `{query}` and `{seed}`
    /// placeholders.
    pub url_template: String,
}

impl StockSource {
    /// Creates a source from a name and URL template.
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    fn render(&self, width: u32, height: u32, query: &str, seed: u64) -> String {
        self.url_template
            .replace("{width}", &width.to_string())
            .replace("{height}", &height.to_string())
            .replace("{query}", query)
            .replace("{seed}", &seed.to_string())
    }
}

fn default_sources() -> Vec<StockSource> {
    vec![
        StockSource::new(
            "unsplash",
            "https://source.unsplash.com/{width}x{height}/?{query}",
        ),
        StockSource::new("loremflickr", "https://loremflickr.com/{width}/{height}/{query}"),
        StockSource::new("picsum", "https://picsum.photos/seed/{seed}/{width}/{height}"),
    ]
}

/// A fetched stock image and the source that served it.
#[derive(Debug, Clone)]
pub struct StockImage {
    /// Winning source name.
    pub source: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// Ordered chain of stock sources, tried until one yields bytes.
pub struct StockChain {
    client: reqwest::Client,
    sources: Vec<StockSource>,
    seed: Option<u64>,
}

impl StockChain {
    /// Creates a chain over the default public sources.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            sources: default_sources(),
            seed: None,
        }
    }

    /// Replaces the source list, keeping trial order.
    pub fn with_sources(mut self, sources: Vec<StockSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Fixes the `{seed}` placeholder value. Without this the seed is the
    /// current unix millisecond count.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Source names in trial order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }

    /// Fetches one image, trying each source in order. The first 2xx body
    /// wins; a total miss reports every source's failure.
    pub async fn fetch(&self, keywords: &[String], width: u32, height: u32) -> Result<StockImage> {
        if self.sources.is_empty() {
            return Err(NewswallError::NoSourcesConfigured);
        }

        let query = search_query(keywords);
        let seed = self
            .seed
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);

        let outcome = first_success(
            &self.sources,
            |source| source.name.clone(),
            |source| self.fetch_one(source, width, height, &query, seed).boxed(),
        )
        .await;

        match outcome {
            Ok((source, data)) => {
                tracing::info!(source = %source, bytes = data.len(), "stock image fetched");
                Ok(StockImage { source, data })
            }
            Err(causes) => Err(NewswallError::StockExhausted { causes }),
        }
    }

    async fn fetch_one(
        &self,
        source: &StockSource,
        width: u32,
        height: u32,
        query: &str,
        seed: u64,
    ) -> Result<Vec<u8>> {
        let url = source.render(width, height, query, seed);
        tracing::debug!(source = %source.name, %url, "trying stock source");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewswallError::Api {
                status: status.as_u16(),
                message: url,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl Default for StockChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Comma-joined search query from the first five keywords.
fn search_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .take(5)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
