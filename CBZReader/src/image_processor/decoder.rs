//! Header-only image probing
//!
//! Page dimensions come from the image header through the `image` crate;
//! pixel data is never decoded here, pages are handed to the renderer as-is.

use crate::utils::error::{CbzError, Result};
use image::ImageReader;
use std::io::Cursor;

/// Read pixel dimensions from an encoded image
///
/// # Returns
/// * `Ok((width, height))` - Dimensions from the image header
/// * `Err(CbzError::Image)` - Empty data, unknown format or corrupt header
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    if data.is_empty() {
        return Err(CbzError::Image("Empty image data".to_string()));
    }

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CbzError::Image(format!("Format detection failed: {}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| CbzError::Image(format!("Failed to read image header: {}", e)))
}

/// Dimensions for a page, `(0, 0)` when they cannot be determined
///
/// One unreadable page must not abort the whole archive.
pub fn page_dimensions(data: &[u8], filename: &str) -> (u32, u32) {
    match probe_dimensions(data) {
        Ok(dims) => dims,
        Err(e) => {
            tracing::debug!("No dimensions for {}: {}", filename, e);
            (0, 0)
        }
    }
}
