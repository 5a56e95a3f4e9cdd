//! Full acquisition example: a generator with the stock chain as safety net.
//!
//! Run with: `cargo run --example acquire_wallpaper`
//!
//! Uses `GEMINI_API_KEY` when set; without it the stock chain serves.

use newswall::{AcquisitionPipeline, GeminiProvider, ImageRequest};

#[tokio::main]
async fn main() -> newswall::Result<()> {
    let mut pipeline = AcquisitionPipeline::new();
    if std::env::var("GEMINI_API_KEY").is_ok() {
        let provider = GeminiProvider::builder()
            .model("gemini-2.5-flash-image")
            .build();
        pipeline = pipeline.with_generator(Box::new(provider));
    }

    let request = ImageRequest::new("A stormy harbor at dawn, cinematic light")
        .with_size(1920, 1080)
        .with_keywords(vec!["storm".into(), "harbor".into()]);

    let image = pipeline.acquire(&request).await?;
    image.save("wallpaper.png")?;
    println!(
        "Acquired image: {} bytes via {}",
        image.size(),
        image.origin
    );

    Ok(())
}
