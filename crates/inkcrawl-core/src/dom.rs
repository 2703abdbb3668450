//! Thin helpers over the `scraper` DOM.
//!
//! The core never owns a DOM tree; it borrows `ElementRef`s out of a parsed
//! [`Html`] document and reasons about them through these functions.

use scraper::{ElementRef, Html};
use url::Url;

use crate::error::ScrapeError;

/// Raster file extensions accepted as comic-image sources.
pub const RASTER_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Parse fetched page bytes into a DOM, replacing invalid UTF-8.
pub fn parse(bytes: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(bytes))
}

/// All elements of the document in document order (depth-first pre-order).
pub fn elements(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
}

/// Ancestor elements of `node`, nearest first, up to the document root.
pub fn ancestors<'a>(node: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    node.ancestors().filter_map(ElementRef::wrap)
}

/// Strict-descendant elements of `node` in document order.
pub fn descendants<'a>(node: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    node.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Descendant `<img>` elements of `node`.
pub fn descendant_images<'a>(node: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    descendants(node).filter(|e| is_image(*e))
}

pub fn is_image(node: ElementRef<'_>) -> bool {
    node.value().name() == "img"
}

/// Concatenated text of the node and its descendants.
pub fn text(node: ElementRef<'_>) -> String {
    node.text().collect()
}

/// Whether the node sits inside a `<header>` region.
pub fn in_header(node: ElementRef<'_>) -> bool {
    ancestors(node).any(|a| a.value().name() == "header")
}

/// Resolve `href` against the page URL `base`, mirroring browser semantics.
pub fn resolve(base: &str, href: &str) -> Result<String, ScrapeError> {
    let base = Url::parse(base).map_err(|e| ScrapeError::InvalidUrl(format!("{base}: {e}")))?;
    let joined = base
        .join(href)
        .map_err(|e| ScrapeError::InvalidUrl(format!("{href}: {e}")))?;
    Ok(joined.into())
}

/// Lowercased extension of the path component of a URL or bare source string.
///
/// Query strings and fragments are ignored, so `strip.png?cache=1` is `png`.
pub fn path_extension(src: &str) -> Option<String> {
    let path = match Url::parse(src) {
        Ok(url) => url.path().to_string(),
        Err(_) => src.split(['?', '#']).next().unwrap_or("").to_string(),
    };
    let file = path.rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Whether an `img` source points at a raster file type we archive.
pub fn is_raster_source(src: &str) -> bool {
    match path_extension(src) {
        Some(ext) => RASTER_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}
