//! The comic session: one archive, its metadata, and its crawl progress.
//!
//! Generic over the trait seams so creation (which runs inference over the
//! network) and crawling are testable without real HTTP.

use chrono::Utc;

use crate::dom;
use crate::error::ScrapeError;
use crate::infer;
use crate::models::{
    ComicMetadata, ComicSpec, CrawlProgress, METADATA_MEMBER, PROGRESS_MEMBER, image_member,
};
use crate::probe::{DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH};
use crate::traits::{Archive, Fetcher, ImageDecoder};

/// A comic bound to its archive for the duration of one session.
///
/// The archive handle is owned exclusively; dropping the session releases it
/// on every exit path. All persisted state is readable at the last completed
/// commit at any point in between.
pub struct Comic<A: Archive> {
    archive: A,
    metadata: ComicMetadata,
    progress: CrawlProgress,
    /// Index of the last image whose bytes reached the archive. Runs ahead
    /// of `progress.last_index` between commits.
    unsaved_index: u32,
}

impl<A: Archive> Comic<A> {
    /// Create a new comic: run inference over the two sample pages, copy the
    /// optional side files, and write the initial metadata and progress
    /// records.
    pub fn create<F: Fetcher, D: ImageDecoder>(
        mut archive: A,
        spec: &ComicSpec,
        fetcher: &F,
        decoder: &D,
    ) -> Result<Self, ScrapeError> {
        spec.validate()?;
        tracing::info!(title = %spec.title, "Creating comic");

        let description_ref =
            copy_local(&mut archive, spec.description_file.as_deref(), ".description")?;
        let cover_ref = copy_local(&mut archive, spec.cover_file.as_deref(), "cover")?;

        let min_size = match (spec.min_width, spec.min_height) {
            (None, None) => None,
            (w, h) => Some((
                w.unwrap_or(DEFAULT_MIN_WIDTH),
                h.unwrap_or(DEFAULT_MIN_HEIGHT),
            )),
        };
        let (link_identifier, image_identifier) = infer::infer_identifiers(
            fetcher,
            decoder,
            &spec.start_page,
            &spec.next_page,
            min_size,
        )?;

        let metadata = ComicMetadata {
            title: spec.title.clone(),
            authors: spec.authors.clone(),
            start_page: spec.start_page.clone(),
            description_ref,
            cover_ref,
            created_at: Utc::now(),
        };
        let progress = CrawlProgress {
            last_index: 0,
            last_images: Vec::new(),
            last_page: String::new(),
            link_identifier,
            image_identifier,
            reconnect: spec.reconnect,
        };
        archive.write(METADATA_MEMBER, &serde_json::to_vec_pretty(&metadata)?)?;
        archive.write(PROGRESS_MEMBER, &serde_json::to_vec_pretty(&progress)?)?;

        Ok(Self {
            archive,
            metadata,
            progress,
            unsaved_index: 0,
        })
    }

    /// Open an existing comic from its archive records.
    pub fn open(archive: A) -> Result<Self, ScrapeError> {
        let metadata: ComicMetadata = serde_json::from_slice(&archive.read(METADATA_MEMBER)?)?;
        let progress: CrawlProgress = serde_json::from_slice(&archive.read(PROGRESS_MEMBER)?)?;
        let unsaved_index = progress.last_index;
        Ok(Self {
            archive,
            metadata,
            progress,
            unsaved_index,
        })
    }

    pub fn metadata(&self) -> &ComicMetadata {
        &self.metadata
    }

    pub fn progress(&self) -> &CrawlProgress {
        &self.progress
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    /// Fetch one image and append it to the archive.
    ///
    /// The running index advances only after the bytes are written, so a
    /// failed fetch never burns an index.
    pub fn add_image<F: Fetcher, D: ImageDecoder>(
        &mut self,
        fetcher: &F,
        decoder: &D,
        url: &str,
    ) -> Result<u32, ScrapeError> {
        let index = self.unsaved_index + 1;
        let bytes = if self.progress.reconnect {
            fetcher.fetch_with_reconnect(url)?
        } else {
            fetcher.fetch(url)?
        };
        let ext = decoder
            .extension(&bytes)
            .map(str::to_string)
            .or_else(|| dom::path_extension(url))
            .unwrap_or_else(|| "bin".to_string());
        self.archive.write(&image_member(index, &ext), &bytes)?;
        self.unsaved_index = index;
        tracing::debug!(index, %url, %ext, "Archived image");
        Ok(index)
    }

    /// The single per-page commit point: record the processed page and its
    /// image set, roll the index forward, and persist the progress record.
    pub fn commit_page(&mut self, page: &str, images: &[String]) -> Result<(), ScrapeError> {
        self.progress.last_page = page.to_string();
        self.progress.last_images = images.to_vec();
        self.progress.last_index = self.unsaved_index;
        self.archive
            .write(PROGRESS_MEMBER, &serde_json::to_vec_pretty(&self.progress)?)
    }
}

/// Copy a local side file (cover, description) into the archive, keeping its
/// extension. Returns the member name written.
fn copy_local<A: Archive>(
    archive: &mut A,
    path: Option<&str>,
    stem: &str,
) -> Result<Option<String>, ScrapeError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = std::fs::read(path)
        .map_err(|e| ScrapeError::Archive(format!("reading local file {path}: {e}")))?;
    let ext = dom::path_extension(path).unwrap_or_else(|| "txt".to_string());
    let member = format!("{stem}.{ext}");
    archive.write(&member, &bytes)?;
    Ok(Some(member))
}
