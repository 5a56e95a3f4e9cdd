//! Image acquisition: providers, stock fallback, orchestration.

mod acquire;
mod journal;
mod provider;
pub mod providers;
mod stock;
mod types;

pub use acquire::AcquisitionPipeline;
pub use journal::{AttemptRecord, AttemptSink, FileAttemptLog, MemorySink};
pub use provider::ImageProvider;
pub use stock::{StockChain, StockImage, StockSource};
pub use types::{AcquiredImage, ImageFormat, ImageOrigin, ImageRequest};
