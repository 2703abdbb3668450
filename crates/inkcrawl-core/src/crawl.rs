//! The resumable crawl loop.
//!
//! Applies a stored identifier pair to successive fetched pages, archiving
//! images and committing progress once per fully processed page. Strictly
//! sequential: one page, one link, one image batch at a time.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use scraper::Html;

use crate::comic::Comic;
use crate::dom;
use crate::error::ScrapeError;
use crate::identifier::Identifier;
use crate::traits::{Archive, Fetcher, ImageDecoder};

#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Begin at this page instead of resuming from stored progress.
    pub start_override: Option<String>,
    /// Remaining-page budget; `None` means unbounded.
    pub pages: Option<u32>,
}

/// Expected end states of a crawl. These are outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The image identifier matched nothing on the current page.
    NoImages,
    /// The extracted image set equals the immediately previous one.
    ///
    /// Only single-step repetition is detected; a multi-hop cycle (A→B→A)
    /// passes through unnoticed.
    DuplicateContent,
    /// The next link points back at the page just processed.
    SelfLoop,
    /// The link identifier matched nothing, or matched an anchor without an
    /// href.
    NoLink,
    /// The remaining-page budget reached zero.
    BudgetExhausted,
    /// The caller raised the interrupt flag; progress is intact up to the
    /// last commit.
    Interrupted,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Termination::NoImages => "no images found",
            Termination::DuplicateContent => "duplicate content",
            Termination::SelfLoop => "next link loops back to the same page",
            Termination::NoLink => "no further link",
            Termination::BudgetExhausted => "page budget exhausted",
            Termination::Interrupted => "interrupted by caller",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub reason: Termination,
    pub pages_scraped: u32,
    pub images_added: u32,
    /// Last committed page, straight from the persisted progress.
    pub last_page: String,
}

/// Resolve the next-page URL identified by `identifier` on the current page.
pub fn find_link(
    doc: &Html,
    page: &str,
    identifier: &Identifier,
) -> Result<Option<String>, ScrapeError> {
    let found = identifier.identify(doc);
    match found.first().and_then(|e| e.value().attr("href")) {
        Some(href) => Ok(Some(dom::resolve(page, href)?)),
        None => {
            tracing::debug!(%identifier, %page, "No link found");
            Ok(None)
        }
    }
}

/// Resolve the image URLs identified by `identifier`, in document order,
/// deduplicated.
pub fn find_images(
    doc: &Html,
    page: &str,
    identifier: &Identifier,
) -> Result<Vec<String>, ScrapeError> {
    let mut urls = Vec::new();
    for node in identifier.identify(doc) {
        if let Some(src) = node.value().attr("src") {
            let url = dom::resolve(page, src)?;
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }
    Ok(urls)
}

/// Run the crawl until a termination condition or a fatal error.
///
/// A fatal page-fetch failure aborts with the last committed progress
/// preserved; the interrupt flag is honored at the loop boundary so a
/// half-written commit is never observable.
pub fn crawl<A: Archive, F: Fetcher, D: ImageDecoder>(
    comic: &mut Comic<A>,
    fetcher: &F,
    decoder: &D,
    options: &CrawlOptions,
    interrupt: &AtomicBool,
) -> Result<CrawlOutcome, ScrapeError> {
    let link_identifier = comic.progress().link_identifier.clone();
    let image_identifier = comic.progress().image_identifier.clone();
    let mut last_images = comic.progress().last_images.clone();
    let mut remaining = options.pages;
    let mut pages_scraped = 0u32;
    let mut images_added = 0u32;

    // Explicit override beats resumption beats fresh start.
    let mut current: Option<String> = match &options.start_override {
        Some(url) => {
            tracing::info!(%url, "Starting scrape from explicit page");
            Some(url.clone())
        }
        None if !comic.progress().last_page.is_empty() => {
            // Re-derive the next page from a freshly fetched copy of the
            // last one; a cached next URL could be stale.
            let last_page = comic.progress().last_page.clone();
            tracing::info!(%last_page, "Resuming scrape");
            let doc = dom::parse(&fetcher.fetch(&last_page)?);
            find_link(&doc, &last_page, &link_identifier)?
        }
        None => {
            let start = comic.metadata().start_page.clone();
            tracing::info!(%start, "Starting fresh scrape");
            Some(start)
        }
    };

    let reason = loop {
        let Some(page) = current.take() else {
            break Termination::NoLink;
        };
        if interrupt.load(Ordering::Relaxed) {
            break Termination::Interrupted;
        }
        if remaining == Some(0) {
            break Termination::BudgetExhausted;
        }

        tracing::info!(index = comic.progress().last_index + 1, %page, "Scraping page");
        let doc = dom::parse(&fetcher.fetch(&page)?);

        let images = find_images(&doc, &page, &image_identifier)?;
        if images.is_empty() {
            tracing::info!(%page, "No images found, ending");
            break Termination::NoImages;
        }
        if images == last_images {
            tracing::info!(%page, "Duplicate content, ending");
            break Termination::DuplicateContent;
        }

        for url in &images {
            comic.add_image(fetcher, decoder, url)?;
            images_added += 1;
        }
        comic.commit_page(&page, &images)?;
        pages_scraped += 1;
        last_images = images;

        match find_link(&doc, &page, &link_identifier)? {
            None => break Termination::NoLink,
            Some(next) if next == page => break Termination::SelfLoop,
            Some(next) => current = Some(next),
        }
        if let Some(r) = remaining.as_mut() {
            *r -= 1;
        }
    };

    let last_page = comic.progress().last_page.clone();
    tracing::info!(%reason, pages_scraped, images_added, %last_page, "Scrape ended");
    Ok(CrawlOutcome {
        reason,
        pages_scraped,
        images_added,
        last_page,
    })
}
