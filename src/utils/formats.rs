use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::InputError;

/// Still-image formats the backend accepts as upload and may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    WebP,
}

impl ImageFormat {
    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::JPEG => &["jpg", "jpeg", "jfif"],
            Self::PNG => &["png"],
            Self::WebP => &["webp"],
        }
    }

    /// Get the primary extension for this format
    pub fn primary_extension(&self) -> &str {
        self.extensions()[0]
    }

    /// MIME type sent with uploads and expected in downloads
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::JPEG => "image/jpeg",
            Self::PNG => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// Maps a response `Content-Type` back to a format, ignoring parameters like `charset`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::JPEG),
            "image/png" => Some(Self::PNG),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = InputError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "jfif" => Ok(Self::JPEG),
            "png" => Ok(Self::PNG),
            "webp" => Ok(Self::WebP),
            _ => Err(InputError::UnsupportedExtension(ext)),
        }
    }
}

/// Get format from file extension
pub fn format_from_extension(path: &str) -> Result<ImageFormat, InputError> {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| InputError::UnsupportedExtension(format!("{} (no extension)", path)))?;

    ImageFormat::from_str(ext)
}
