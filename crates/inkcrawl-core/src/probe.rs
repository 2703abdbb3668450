//! Size-based disambiguation of candidate comic images.
//!
//! "The comic image" has no a-priori ground truth, so the prober fetches
//! every plausible image and measures its pixel dimensions. Images meeting a
//! minimum size qualify; when none do, the single largest by area is kept so
//! the qualifying set is never empty on a non-empty page.

use std::path::Path;

use scraper::ElementRef;

use crate::dom;
use crate::error::ScrapeError;
use crate::traits::{Fetcher, ImageDecoder};

pub const DEFAULT_MIN_WIDTH: u32 = 350;
pub const DEFAULT_MIN_HEIGHT: u32 = 350;

/// Fetches candidate images and filters them by pixel size.
pub struct SizeProber<'a, F, D> {
    fetcher: &'a F,
    decoder: &'a D,
    min_width: u32,
    min_height: u32,
}

impl<'a, F: Fetcher, D: ImageDecoder> SizeProber<'a, F, D> {
    pub fn new(fetcher: &'a F, decoder: &'a D) -> Self {
        Self {
            fetcher,
            decoder,
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
        }
    }

    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    /// The subset of `images` whose width AND height meet the minimum, or
    /// the single largest by area when none qualify.
    ///
    /// Sources are resolved against `page_url` and fetched with reconnect
    /// retry; a source that is an existing local path is read from disk
    /// instead. Unreadable bytes count as zero-size so selection degrades
    /// gracefully rather than aborting.
    pub fn qualifying<'t>(
        &self,
        images: &[ElementRef<'t>],
        page_url: &str,
    ) -> Result<Vec<ElementRef<'t>>, ScrapeError> {
        let mut measured: Vec<(ElementRef<'t>, (u32, u32))> = Vec::new();
        for node in images {
            let Some(src) = node.value().attr("src") else {
                continue;
            };
            let size = if Path::new(src).exists() {
                match std::fs::read(src) {
                    Ok(bytes) => self.measure(&bytes, src),
                    Err(e) => {
                        tracing::warn!(%src, error = %e, "Could not read local image");
                        (0, 0)
                    }
                }
            } else {
                let url = dom::resolve(page_url, src)?;
                let bytes = self.fetcher.fetch_with_reconnect(&url)?;
                if bytes.is_empty() {
                    return Err(ScrapeError::Http(format!("no image data read from {url}")));
                }
                self.measure(&bytes, src)
            };
            tracing::debug!(%src, width = size.0, height = size.1, "Probed image");
            measured.push((*node, size));
        }

        let qualifying: Vec<ElementRef<'t>> = measured
            .iter()
            .filter(|(_, (w, h))| *w >= self.min_width && *h >= self.min_height)
            .map(|(node, _)| *node)
            .collect();
        if !qualifying.is_empty() {
            return Ok(qualifying);
        }

        tracing::info!(
            min_width = self.min_width,
            min_height = self.min_height,
            "No image met the minimum size, falling back to largest by area"
        );
        Ok(measured
            .iter()
            .max_by_key(|(_, (w, h))| u64::from(*w) * u64::from(*h))
            .map(|(node, _)| *node)
            .into_iter()
            .collect())
    }

    /// Decode failure is absorbed as zero-size.
    fn measure(&self, bytes: &[u8], src: &str) -> (u32, u32) {
        match self.decoder.dimensions(bytes) {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!(%src, error = %e, "Unknown image format");
                (0, 0)
            }
        }
    }
}
