//! Trait seams for the capabilities the core consumes.
//!
//! Everything here is synchronous: the resource model is single-threaded and
//! strictly sequential, with blocking fetches and decodes as the only
//! suspension points. Concrete implementations live in `inkcrawl-client`
//! (HTTP, image decoding) and `inkcrawl-archive` (durable storage); mocks for
//! all three live in [`crate::testutil`].

use crate::error::ScrapeError;

/// Silent retries permitted for an image fetch under the reconnect flag.
pub const RECONNECT_ATTEMPTS: usize = 3;

/// Fetches raw bytes from a URL.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ScrapeError>;

    /// Fetch with a bounded number of silent retries on transient failure.
    ///
    /// Used for image fetches only; page fetches call [`fetch`](Self::fetch)
    /// directly and fail immediately.
    fn fetch_with_reconnect(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch(url) {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.is_retryable() && attempt <= RECONNECT_ATTEMPTS => {
                    tracing::warn!(%url, attempt, error = %e, "Fetch failed, reconnecting");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Decodes image bytes into pixel dimensions and sniffs the file format.
pub trait ImageDecoder {
    /// Pixel `(width, height)` of the image.
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), ScrapeError>;

    /// Preferred file extension for the format the bytes are in, if it can
    /// be determined.
    fn extension(&self, bytes: &[u8]) -> Option<&'static str>;
}

/// Durable key-value store for images, metadata, and crawl progress.
///
/// Members are plain file names. Each `write` must be durable on return so
/// that every exit path leaves the archive readable at the last completed
/// commit. The handle is exclusively owned by one crawl session.
pub trait Archive {
    fn write(&mut self, member: &str, content: &[u8]) -> Result<(), ScrapeError>;

    fn read(&self, member: &str) -> Result<Vec<u8>, ScrapeError>;

    /// Member names currently present, sorted.
    fn list(&self) -> Result<Vec<String>, ScrapeError>;
}
