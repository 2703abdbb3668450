//! Disk storage for scraped comics.

pub mod dir;
pub mod library;

pub use dir::DirArchive;
pub use library::Library;
