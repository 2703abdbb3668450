pub mod candidates;
pub mod comic;
pub mod crawl;
pub mod dom;
pub mod error;
pub mod identifier;
pub mod infer;
pub mod models;
pub mod probe;
pub mod traits;
pub mod validator;

#[cfg(test)]
pub(crate) mod testutil;

pub use comic::Comic;
pub use crawl::{CrawlOptions, CrawlOutcome, Termination, crawl};
pub use error::ScrapeError;
pub use identifier::{Identifier, Strategy};
pub use models::{ComicMetadata, ComicSpec, CrawlProgress};
pub use traits::{Archive, Fetcher, ImageDecoder};
