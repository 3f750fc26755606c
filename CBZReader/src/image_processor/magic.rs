//! Page format sniffing from magic headers (file signatures)
//!
//! Only the formats a CBZ page may carry are recognised:
//!
//! - **JPEG**: `FF D8 FF`
//! - **PNG**: `89 50 4E 47 0D 0A 1A 0A`
//! - **GIF**: `47 49 46 38` (GIF87a/GIF89a)
//! - **WebP**: `52 49 46 46 ?? ?? ?? ?? 57 45 42 50` (RIFF....WEBP)
//!
//! The result labels the page blob for a renderer. It never decides whether
//! an entry is a page; that is the extension allow-list's job.

use crate::utils::error::{CbzError, Result};

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1A\n";

/// Image format detected from a page's leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::WebP => "WebP",
        }
    }

    /// MIME type a renderer should attach to the page blob
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }
}

/// Detect image format from magic bytes
///
/// # Returns
/// * `Ok(ImageFormat)` - Recognised page format
/// * `Err(CbzError::Image)` - Empty, truncated or unrecognised data
pub fn detect_image_format(data: &[u8]) -> Result<ImageFormat> {
    if data.is_empty() {
        return Err(CbzError::Image("Empty data".to_string()));
    }

    const MIN_BYTES: usize = 4;
    if data.len() < MIN_BYTES {
        return Err(CbzError::Image(format!(
            "Insufficient data for format detection (need {} bytes, got {})",
            MIN_BYTES,
            data.len()
        )));
    }

    // JPEG first, it dominates comic archives
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }

    if data.starts_with(PNG_SIGNATURE) {
        return Ok(ImageFormat::Png);
    }

    if data.starts_with(b"GIF8") {
        return Ok(ImageFormat::Gif);
    }

    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(ImageFormat::WebP);
    }

    Err(CbzError::Image(format!(
        "Unrecognized image format (first 16 bytes: {:02X?})",
        &data[..data.len().min(16)]
    )))
}

/// Best-effort variant used while materialising pages
///
/// A page whose bytes do not match a known signature is still a page; it just
/// has no format label.
pub fn sniff_page_format(data: &[u8], filename: &str) -> Option<ImageFormat> {
    match detect_image_format(data) {
        Ok(format) => Some(format),
        Err(e) => {
            tracing::warn!(
                "File {} has image extension but failed magic header check: {}",
                filename,
                e
            );
            None
        }
    }
}
