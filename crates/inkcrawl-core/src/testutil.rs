//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. The fetcher and
//! archive use `Arc<Mutex<_>>` for interior mutability so tests can keep a
//! handle and assert on recorded state afterwards.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::error::ScrapeError;
use crate::traits::{Archive, Fetcher, ImageDecoder};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher serving a URL → bytes map, recording every request.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    /// URLs that fail with a retryable network error when requested.
    flaky: Arc<Mutex<HashMap<String, usize>>>,
    /// Every URL requested, in order.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`, replacing any previous entry.
    pub fn insert(&self, url: &str, body: Vec<u8>) {
        self.pages.lock().unwrap().insert(url.to_string(), body);
    }

    /// Make the next `failures` requests for `url` fail retryably before the
    /// stored body is served.
    pub fn fail_times(&self, url: &str, failures: usize) {
        self.flaky.lock().unwrap().insert(url.to_string(), failures);
    }

    /// Number of times `url` was requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.as_str() == url)
            .count()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        self.requests.lock().unwrap().push(url.to_string());
        let mut flaky = self.flaky.lock().unwrap();
        if let Some(remaining) = flaky.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ScrapeError::Network(format!("connection reset: {url}")));
            }
        }
        drop(flaky);
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Http(format!("HTTP 404 for {url}")))
    }
}

// ---------------------------------------------------------------------------
// MockDecoder
// ---------------------------------------------------------------------------

/// Produce bytes the [`MockDecoder`] reads back as a `width`×`height` image
/// in the given format.
pub fn fake_image(width: u32, height: u32, ext: &str) -> Vec<u8> {
    format!("IMG {width} {height} {ext}").into_bytes()
}

/// Mock decoder understanding only [`fake_image`] bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDecoder;

fn parse_fake(bytes: &[u8]) -> Option<(u32, u32, String)> {
    let text = std::str::from_utf8(bytes).ok()?;
    let mut parts = text.strip_prefix("IMG ")?.split(' ');
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    let ext = parts.next()?.to_string();
    Some((width, height, ext))
}

impl ImageDecoder for MockDecoder {
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), ScrapeError> {
        parse_fake(bytes)
            .map(|(w, h, _)| (w, h))
            .ok_or_else(|| ScrapeError::Decode("not a fake image".to_string()))
    }

    fn extension(&self, bytes: &[u8]) -> Option<&'static str> {
        match parse_fake(bytes)?.2.as_str() {
            "png" => Some("png"),
            "jpg" | "jpeg" => Some("jpg"),
            "gif" => Some("gif"),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryArchive
// ---------------------------------------------------------------------------

/// In-memory archive; clones share storage so tests can inspect what a
/// session wrote.
#[derive(Clone, Default)]
pub struct MemoryArchive {
    members: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Archive for MemoryArchive {
    fn write(&mut self, member: &str, content: &[u8]) -> Result<(), ScrapeError> {
        self.members
            .lock()
            .unwrap()
            .insert(member.to_string(), content.to_vec());
        Ok(())
    }

    fn read(&self, member: &str) -> Result<Vec<u8>, ScrapeError> {
        self.members
            .lock()
            .unwrap()
            .get(member)
            .cloned()
            .ok_or_else(|| ScrapeError::Archive(format!("no such member: {member}")))
    }

    fn list(&self) -> Result<Vec<String>, ScrapeError> {
        Ok(self.members.lock().unwrap().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fetcher_serves_and_records() {
        let fetcher = MockFetcher::new();
        fetcher.insert("http://x.example/a", b"hello".to_vec());
        assert_eq!(fetcher.fetch("http://x.example/a").unwrap(), b"hello");
        assert!(fetcher.fetch("http://x.example/missing").is_err());
        assert_eq!(fetcher.request_count("http://x.example/a"), 1);
        assert_eq!(fetcher.request_count("http://x.example/missing"), 1);
    }

    #[test]
    fn test_mock_fetcher_flaky_then_recovers() {
        let fetcher = MockFetcher::new();
        fetcher.insert("http://x.example/a.png", b"img".to_vec());
        fetcher.fail_times("http://x.example/a.png", 2);
        assert!(fetcher.fetch("http://x.example/a.png").is_err());
        assert!(fetcher.fetch("http://x.example/a.png").is_err());
        assert_eq!(fetcher.fetch("http://x.example/a.png").unwrap(), b"img");
    }

    #[test]
    fn test_mock_decoder_round_trip() {
        let bytes = fake_image(400, 350, "jpeg");
        assert_eq!(MockDecoder.dimensions(&bytes).unwrap(), (400, 350));
        assert_eq!(MockDecoder.extension(&bytes), Some("jpg"));
        assert!(MockDecoder.dimensions(b"garbage").is_err());
        assert_eq!(MockDecoder.extension(b"garbage"), None);
    }

    #[test]
    fn test_memory_archive_shared_between_clones() {
        let mut archive = MemoryArchive::new();
        let viewer = archive.clone();
        archive.write("image1.png", b"bytes").unwrap();
        assert_eq!(viewer.read("image1.png").unwrap(), b"bytes");
        assert_eq!(viewer.list().unwrap(), vec!["image1.png".to_string()]);
    }
}
