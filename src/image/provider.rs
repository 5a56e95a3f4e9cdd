//! Image provider trait.

use crate::error::Result;
use crate::image::types::ImageRequest;
use async_trait::async_trait;

/// Trait for image generation providers.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image for the given request, returning raw bytes.
    ///
    /// A success is always a complete image; on failure no partial data
    /// is returned.
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>>;

    /// Short provider name used for display and provenance, e.g. "gemini".
    fn name(&self) -> &'static str;

    /// Model identifier this provider calls.
    fn model(&self) -> &str;
}
