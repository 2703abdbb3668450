use chrono::{DateTime, Utc};

use crate::error::ScrapeError;
use crate::identifier::Identifier;

/// Archive member holding the serialized [`ComicMetadata`].
pub const METADATA_MEMBER: &str = ".metadata.json";
/// Archive member holding the serialized [`CrawlProgress`].
pub const PROGRESS_MEMBER: &str = ".progress.json";

/// Archive member name for the comic image at `index`.
pub fn image_member(index: u32, ext: &str) -> String {
    format!("image{index}.{ext}")
}

/// User-supplied description of a comic to scrape.
///
/// Loaded from a JSON spec file by the CLI; `start_page` and `next_page` are
/// the two sample pages the inference engine learns from.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ComicSpec {
    pub title: String,
    pub authors: Vec<String>,
    pub start_page: String,
    pub next_page: String,
    /// Local path of a description file to copy into the archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_file: Option<String>,
    /// Local path of a cover image to copy into the archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_file: Option<String>,
    /// Permit bounded silent retries for image fetches.
    #[serde(default)]
    pub reconnect: bool,
    /// Minimum comic-image width for size-based disambiguation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    /// Minimum comic-image height for size-based disambiguation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
}

impl ComicSpec {
    /// Check required fields, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title must not be empty".to_string());
        }
        if self.authors.is_empty() {
            errors.push("at least one author is required".to_string());
        }
        if self.start_page.trim().is_empty() {
            errors.push("start_page must not be empty".to_string());
        }
        if self.next_page.trim().is_empty() {
            errors.push("next_page must not be empty".to_string());
        }
        if self.start_page == self.next_page && !self.start_page.trim().is_empty() {
            errors.push("start_page and next_page must differ".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScrapeError::SpecValidation(errors))
        }
    }
}

/// Durable comic metadata, written once at creation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ComicMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub start_page: String,
    /// Archive member holding the description, when one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_ref: Option<String>,
    /// Archive member holding the cover image, when one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Crawl position and the proven identifier pair.
///
/// Owned exclusively by the crawl session and persisted once per fully
/// processed page: the commit unit is one page's images plus this record.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CrawlProgress {
    /// Index of the last committed image; zero before any commit.
    pub last_index: u32,
    /// Image URLs of the last committed page, in document order, deduped.
    pub last_images: Vec<String>,
    /// URL of the last committed page; empty before any commit.
    pub last_page: String,
    pub link_identifier: Identifier,
    pub image_identifier: Identifier,
    pub reconnect: bool,
}
