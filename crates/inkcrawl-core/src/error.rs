use thiserror::Error;

/// Application-wide error types for inkcrawl.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// HTTP request failed (non-success status, malformed response).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Image bytes could not be decoded.
    ///
    /// Absorbed at the size prober (treated as zero-size) so selection
    /// degrades gracefully; fatal only where raised directly.
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Selector inference exhausted every candidate without proving one.
    #[error("no proven {role} identifier ({} candidates tried)", tried.len())]
    NoProvenIdentifier {
        /// Which inference produced this: "link" or "image".
        role: &'static str,
        /// Display form of every candidate that was generated and rejected.
        tried: Vec<String>,
    },

    /// Archive read/write failed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A comic spec is missing required fields.
    #[error("Invalid comic spec: {}", .0.join("; "))]
    SpecValidation(Vec<String>),
}

impl ScrapeError {
    /// Returns true if this error is transient and worth retrying.
    ///
    /// Drives the bounded reconnect retry for image fetches; page fetches
    /// never retry regardless.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScrapeError::Network(_) | ScrapeError::Timeout(_) => true,
            ScrapeError::Http(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }
}
