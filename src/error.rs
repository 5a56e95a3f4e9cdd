//! Error types for image acquisition.

/// Errors that can occur while acquiring or applying a wallpaper image.
#[derive(Debug, thiserror::Error)]
pub enum NewswallError {
    /// No API key configured for a provider.
    #[error("no API key configured for {0}")]
    MissingApiKey(String),

    /// No model identifier configured for a provider.
    #[error("no model configured for {0}")]
    MissingModel(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Images endpoint answered 2xx but none of the known payload
    /// locations held image data.
    #[error("images endpoint returned no image payload")]
    MissingImageData,

    /// Content endpoint answered 2xx but no part carried inline image data.
    #[error("no inline image data in model response")]
    MissingInlineData,

    /// Response body did not match any expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Both generative endpoints failed, in attempt order.
    #[error("image generation failed: {primary}; fallback endpoint also failed: {fallback}")]
    GenerationFailed {
        primary: Box<NewswallError>,
        fallback: Box<NewswallError>,
    },

    /// Every stock source in the chain failed, in trial order.
    #[error("all stock image sources failed: {}", join_causes(.causes))]
    StockExhausted {
        causes: Vec<(String, NewswallError)>,
    },

    /// The stock chain was configured with zero sources.
    #[error("no stock image sources configured")]
    NoSourcesConfigured,

    /// Wallpaper could not be applied to the desktop session.
    #[error("desktop environment error: {0}")]
    DesktopEnv(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_causes(causes: &[(String, NewswallError)]) -> String {
    causes
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for image acquisition operations.
pub type Result<T> = std::result::Result<T, NewswallError>;
