#![warn(missing_docs)]
//! Newswall - turn the morning's headlines into a fresh desktop wallpaper.
//!
//! The pipeline pulls headlines from configured feeds, distills them into
//! keywords, builds (and optionally refines) an image prompt, then acquires
//! a wallpaper from a generative provider with a chain of public stock
//! sources as the safety net.
//!
//! # Quick Start
//!
//! ```no_run
//! use newswall::{AcquisitionPipeline, GeminiProvider, ImageRequest};
//!
//! #[tokio::main]
//! async fn main() -> newswall::Result<()> {
//!     let provider = GeminiProvider::builder()
//!         .model("gemini-2.5-flash-image")
//!         .build();
//!     let pipeline = AcquisitionPipeline::new().with_generator(Box::new(provider));
//!
//!     let request = ImageRequest::new("A stormy harbor at dawn, oil painting")
//!         .with_keywords(vec!["storm".into(), "harbor".into()]);
//!     let image = pipeline.acquire(&request).await?;
//!     image.save("wallpaper.png")?;
//!     Ok(())
//! }
//! ```
//!
//! The `newswall` binary wires the full run: headlines in, wallpaper set.

pub mod config;
mod error;
mod fallback;
pub mod image;
pub mod keywords;
pub mod news;
pub mod prompt;
pub mod refine;
pub mod wallpaper;

// Re-export error types at crate root
pub use error::{NewswallError, Result};

// Re-export commonly used acquisition types
pub use image::providers::{
    GeminiProvider, GeminiProviderBuilder, OpenAiImageProvider, OpenAiImageProviderBuilder,
};
pub use image::{
    AcquiredImage, AcquisitionPipeline, AttemptRecord, AttemptSink, FileAttemptLog, ImageFormat,
    ImageOrigin, ImageProvider, ImageRequest, MemorySink, StockChain, StockImage, StockSource,
};
pub use refine::{PromptRefiner, PromptRefinerBuilder, RefineContext};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{NewswallError, Result};
    pub use crate::image::providers::{GeminiProvider, OpenAiImageProvider};
    pub use crate::image::{
        AcquiredImage, AcquisitionPipeline, ImageProvider, ImageRequest, StockChain,
    };
    pub use crate::refine::PromptRefiner;
}
