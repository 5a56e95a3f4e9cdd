//! Core types for image acquisition.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// A request for one wallpaper-sized image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Headline keywords, used as search terms by stock sources.
    pub keywords: Vec<String>,
}

impl ImageRequest {
    /// Creates a request at the default wallpaper resolution (2560x1440).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            width: 2560,
            height: 1440,
            keywords: Vec::new(),
        }
    }

    /// Sets the desired dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the keywords passed through to stock sources.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Returns the resolution as a `WIDTHxHEIGHT` label.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Where an acquired image came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageOrigin {
    /// Produced by a generative provider.
    Generated {
        /// Provider name, e.g. "gemini".
        provider: String,
        /// Model identifier that produced the image.
        model: String,
    },
    /// Fetched from a public stock source.
    Stock {
        /// Name of the winning source, e.g. "picsum".
        source: String,
    },
}

impl std::fmt::Display for ImageOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generated { provider, model } => write!(f, "{provider} ({model})"),
            Self::Stock { source } => write!(f, "stock:{source}"),
        }
    }
}

/// An image ready to be written to disk, with its provenance.
#[derive(Debug, Clone)]
#[must_use = "acquired image should be saved or processed"]
pub struct AcquiredImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Where the bytes came from.
    pub origin: ImageOrigin,
}

impl AcquiredImage {
    /// Creates a new acquired image.
    pub fn new(data: Vec<u8>, origin: ImageOrigin) -> Self {
        Self { data, origin }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the format detected from magic bytes, if recognized.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_magic_bytes(&self.data)
    }

    /// Returns the file extension for the detected format, defaulting to
    /// `png` when the bytes are not recognized.
    pub fn extension(&self) -> &'static str {
        self.format().unwrap_or_default().extension()
    }

    /// Saves the image atomically: missing parent directories are created,
    /// the bytes land in a sibling temp file, and a rename replaces `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, &self.data)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
