use std::fs;
use std::path::{Path, PathBuf};

use inkcrawl_core::error::ScrapeError;
use inkcrawl_core::traits::Archive;

/// Directory-backed archive: one file per member under a single root.
///
/// Writes go through a temp file and rename, so a member is either absent or
/// complete; a crash mid-commit never leaves a half-written progress record
/// behind.
pub struct DirArchive {
    root: PathBuf,
}

impl DirArchive {
    /// Create a fresh archive at `root`, replacing any existing one.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, ScrapeError> {
        let root = root.into();
        if root.exists() {
            tracing::info!(path = %root.display(), "Removing old archive");
            fs::remove_dir_all(&root)
                .map_err(|e| ScrapeError::Archive(format!("{}: {e}", root.display())))?;
        }
        fs::create_dir_all(&root)
            .map_err(|e| ScrapeError::Archive(format!("{}: {e}", root.display())))?;
        Ok(Self { root })
    }

    /// Open an existing archive.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ScrapeError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ScrapeError::Archive(format!(
                "archive not found: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Members are plain file names; anything path-like is rejected.
    fn member_path(&self, member: &str) -> Result<PathBuf, ScrapeError> {
        if member.is_empty()
            || member.contains('/')
            || member.contains('\\')
            || member.contains("..")
        {
            return Err(ScrapeError::Archive(format!(
                "invalid member name: {member:?}"
            )));
        }
        Ok(self.root.join(member))
    }
}

impl Archive for DirArchive {
    fn write(&mut self, member: &str, content: &[u8]) -> Result<(), ScrapeError> {
        let path = self.member_path(member)?;
        let tmp = self.root.join(format!(".{member}.tmp"));
        fs::write(&tmp, content)
            .map_err(|e| ScrapeError::Archive(format!("writing {member}: {e}")))?;
        fs::rename(&tmp, &path)
            .map_err(|e| ScrapeError::Archive(format!("writing {member}: {e}")))
    }

    fn read(&self, member: &str) -> Result<Vec<u8>, ScrapeError> {
        let path = self.member_path(member)?;
        fs::read(&path).map_err(|e| ScrapeError::Archive(format!("reading {member}: {e}")))
    }

    fn list(&self) -> Result<Vec<String>, ScrapeError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| ScrapeError::Archive(format!("{}: {e}", self.root.display())))?;
        let mut members = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| ScrapeError::Archive(format!("{}: {e}", self.root.display())))?;
            if entry.path().is_file() {
                members.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        members.sort();
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = DirArchive::create(dir.path().join("comic")).unwrap();
        archive.write("image1.png", b"strip one").unwrap();
        archive.write(".progress.json", b"{}").unwrap();

        assert_eq!(archive.read("image1.png").unwrap(), b"strip one");
        assert_eq!(
            archive.list().unwrap(),
            vec![".progress.json".to_string(), "image1.png".to_string()]
        );
    }

    #[test]
    fn test_write_replaces_existing_member() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = DirArchive::create(dir.path().join("comic")).unwrap();
        archive.write(".progress.json", b"old").unwrap();
        archive.write(".progress.json", b"new").unwrap();
        assert_eq!(archive.read(".progress.json").unwrap(), b"new");
    }

    #[test]
    fn test_create_replaces_old_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comic");
        let mut archive = DirArchive::create(&path).unwrap();
        archive.write("image1.png", b"stale").unwrap();
        drop(archive);

        let archive = DirArchive::create(&path).unwrap();
        assert!(archive.read("image1.png").is_err());
    }

    #[test]
    fn test_open_requires_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DirArchive::open(dir.path().join("missing")).is_err());
        DirArchive::create(dir.path().join("comic")).unwrap();
        assert!(DirArchive::open(dir.path().join("comic")).is_ok());
    }

    #[test]
    fn test_rejects_path_like_member_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = DirArchive::create(dir.path().join("comic")).unwrap();
        for member in ["", "a/b.png", "..", "../escape.png", "a\\b.png"] {
            assert!(archive.write(member, b"x").is_err(), "accepted {member:?}");
            assert!(archive.read(member).is_err(), "accepted {member:?}");
        }
    }
}
