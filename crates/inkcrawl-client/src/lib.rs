pub mod decoder;
pub mod fetcher;

pub use decoder::ImageRsDecoder;
pub use fetcher::BlockingFetcher;
