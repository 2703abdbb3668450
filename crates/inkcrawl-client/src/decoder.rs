use std::io::Cursor;

use image::ImageReader;
use inkcrawl_core::error::ScrapeError;
use inkcrawl_core::traits::ImageDecoder;

/// Image decoder backed by the `image` crate.
///
/// Dimensions come from the format header alone, so probing a large strip
/// never decodes the full pixel data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRsDecoder;

impl ImageDecoder for ImageRsDecoder {
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), ScrapeError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ScrapeError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| ScrapeError::Decode(e.to_string()))
    }

    fn extension(&self, bytes: &[u8]) -> Option<&'static str> {
        image::guess_format(bytes)
            .ok()
            .and_then(|format| format.extensions_str().first().copied())
    }
}
