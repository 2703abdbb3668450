use std::time::Duration;

use inkcrawl_core::error::ScrapeError;
use inkcrawl_core::traits::Fetcher;
use reqwest::blocking::Client;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP fetcher using reqwest's blocking client.
///
/// Downloads raw page and image bytes with a configurable timeout. The crawl
/// is strictly sequential, so the blocking surface is the right fit; retry
/// behavior comes from the [`Fetcher`] trait's reconnect default.
#[derive(Clone)]
pub struct BlockingFetcher {
    client: Client,
    timeout_secs: u64,
}

impl BlockingFetcher {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ScrapeError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent("inkcrawl/0.1 (webcomic scraper)")
            .timeout(timeout)
            .build()
            .map_err(|e| ScrapeError::Http(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl Fetcher for BlockingFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                ScrapeError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                ScrapeError::Network(format!("Connection failed: {e}"))
            } else {
                ScrapeError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Http(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| ScrapeError::Http(format!("Failed to read response body: {e}")))?;
        tracing::debug!(%url, bytes = bytes.len(), "Fetched");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        assert!(BlockingFetcher::new().is_ok());
        assert!(BlockingFetcher::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_connection_failure_maps_to_retryable_error() {
        // Nothing listens on this port; no DNS involved.
        let fetcher = BlockingFetcher::with_timeout(Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/never").unwrap_err();
        assert!(err.is_retryable(), "expected retryable, got: {err}");
    }
}
