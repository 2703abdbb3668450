//! The comic library: where archives live on disk.
//!
//! The storage root is always an explicit constructor parameter; there is no
//! process-wide default directory.

use std::fs;
use std::path::{Path, PathBuf};

use inkcrawl_core::error::ScrapeError;
use inkcrawl_core::models::METADATA_MEMBER;

/// Record naming the most recently scraped comic.
const LAST_COMIC_FILE: &str = "lastcomic.json";

#[derive(serde::Serialize, serde::Deserialize)]
struct LastComic {
    last_comic: String,
}

/// A directory of comic archives plus the last-comic pointer.
#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Archive directory for the comic with this title.
    pub fn comic_dir(&self, title: &str) -> PathBuf {
        self.root.join(title)
    }

    /// Whether a comic with this title is already stored.
    pub fn contains(&self, title: &str) -> bool {
        self.comic_dir(title).join(METADATA_MEMBER).is_file()
    }

    /// Titles of the stored comics, sorted.
    pub fn comics(&self) -> Result<Vec<String>, ScrapeError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.root)
            .map_err(|e| ScrapeError::Archive(format!("{}: {e}", self.root.display())))?;
        let mut titles = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| ScrapeError::Archive(format!("{}: {e}", self.root.display())))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.contains(&name) {
                titles.push(name);
            }
        }
        titles.sort();
        Ok(titles)
    }

    /// Title of the most recently scraped comic, if any.
    pub fn last_comic(&self) -> Result<Option<String>, ScrapeError> {
        let path = self.root.join(LAST_COMIC_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes =
            fs::read(&path).map_err(|e| ScrapeError::Archive(format!("{}: {e}", path.display())))?;
        let record: LastComic = serde_json::from_slice(&bytes)?;
        Ok(Some(record.last_comic))
    }

    /// Record `title` as the most recently scraped comic.
    pub fn set_last_comic(&self, title: &str) -> Result<(), ScrapeError> {
        fs::create_dir_all(&self.root)
            .map_err(|e| ScrapeError::Archive(format!("{}: {e}", self.root.display())))?;
        let path = self.root.join(LAST_COMIC_FILE);
        let record = LastComic {
            last_comic: title.to_string(),
        };
        fs::write(&path, serde_json::to_vec_pretty(&record)?)
            .map_err(|e| ScrapeError::Archive(format!("{}: {e}", path.display())))
    }
}
