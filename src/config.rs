//! Configuration: `image.config.json` plus an environment snapshot.

use crate::error::Result;
use crate::keywords::KeywordOptions;
use serde::Deserialize;
use std::path::Path;

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "image.config.json";

/// Output resolution in pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 2560,
            height: 1440,
        }
    }
}

/// On-disk configuration. Every field is optional in the file; missing
/// fields take the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WallpaperConfig {
    /// Feed URLs polled for headlines.
    pub feeds: Vec<String>,
    /// Keyword extraction settings.
    pub keywords: KeywordOptions,
    /// Base style clause for prompts.
    pub style: String,
    /// Vibe clause for prompts.
    pub vibe: String,
    /// Negative prompt clause.
    pub negative: String,
    /// Styles the refinement step draws from at random.
    pub style_pool: Vec<String>,
    /// Artist hints the draft prompt draws from at random.
    pub artist_hints: Vec<String>,
    /// Output resolution.
    pub resolution: Resolution,
    /// Image model for the generative endpoints, empty means unset.
    pub gemini_model: String,
    /// Chat model for refinement, empty falls back to `OPENAI_MODEL`.
    pub openai_text_model: String,
    /// Path of the append-only attempt journal.
    pub attempt_log: String,
}

impl Default for WallpaperConfig {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            keywords: KeywordOptions::default(),
            style: String::new(),
            vibe: String::new(),
            negative: String::new(),
            style_pool: Vec::new(),
            artist_hints: Vec::new(),
            resolution: Resolution::default(),
            gemini_model: String::new(),
            openai_text_model: String::new(),
            attempt_log: "logs/attempts.log".to_string(),
        }
    }
}

impl WallpaperConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Environment snapshot taken once at startup.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// OpenAI API key; empty disables prompt refinement.
    pub openai_api_key: String,
    /// Gemini API key; empty disables generative acquisition.
    pub gemini_api_key: String,
    /// Overrides the configured image model when set and non-empty.
    pub gemini_model: Option<String>,
    /// Desktop session the wallpaper is applied to, lowercased.
    pub desktop_env: String,
    /// Directory images are saved under.
    pub output_dir: String,
}

impl EnvConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: std::env::var("GEMINI_MODEL")
                .ok()
                .filter(|model| !model.is_empty()),
            desktop_env: std::env::var("DESKTOP_ENV")
                .unwrap_or_else(|_| "cinnamon".to_string())
                .to_lowercase(),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
        }
    }
}

/// Timestamp slug for output filenames, local wall-clock time.
pub fn timestamp_slug(now: &chrono::DateTime<chrono::Local>) -> String {
    now.format("%Y%m%d-%H%M").to_string()
}
