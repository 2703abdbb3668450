//! Link and image inference: generation plus validation for each role.
//!
//! Link inference has ground truth for free (the caller already knows the
//! correct next-page URL); image inference has to discover its ground truth
//! through the size prober first.

use scraper::{ElementRef, Html};

use crate::candidates;
use crate::dom;
use crate::error::ScrapeError;
use crate::identifier::Identifier;
use crate::probe::SizeProber;
use crate::traits::{Fetcher, ImageDecoder};
use crate::validator;

/// Derive a proven identifier for the next-page link.
///
/// The valid set is every anchor on page A whose resolved href equals the
/// known next-page URL; multiple ground-truth anchors are acceptable.
pub fn infer_link_identifier(
    doc_a: &Html,
    page_a_url: &str,
    next_url: &str,
    doc_b: &Html,
) -> Result<Identifier, ScrapeError> {
    let target = dom::resolve(page_a_url, next_url)?;
    let anchors: Vec<ElementRef<'_>> = dom::elements(doc_a)
        .filter(|e| e.value().name() == "a")
        .filter(|e| match e.value().attr("href") {
            Some(href) => dom::resolve(page_a_url, href).ok().as_deref() == Some(target.as_str()),
            None => false,
        })
        .collect();
    if anchors.is_empty() {
        tracing::warn!(%target, "No anchor on the start page points at the next page");
        return Err(ScrapeError::NoProvenIdentifier {
            role: "link",
            tried: Vec::new(),
        });
    }
    tracing::debug!(count = anchors.len(), %target, "Collected ground-truth anchors");

    let mut all_candidates = Vec::new();
    for anchor in &anchors {
        all_candidates.extend(candidates::candidates_for(*anchor));
    }
    validator::prove(all_candidates, &anchors, doc_a, doc_b, "link")
}

/// Derive a proven identifier for the comic image(s).
///
/// Plausible images are collected on page A (excluding the page header and
/// non-raster sources), disambiguated by the size prober, and the qualifying
/// set serves as its own ground truth. Returns the first image's proven
/// identifier.
pub fn infer_image_identifier<F: Fetcher, D: ImageDecoder>(
    doc_a: &Html,
    page_a_url: &str,
    doc_b: &Html,
    prober: &SizeProber<'_, F, D>,
) -> Result<Identifier, ScrapeError> {
    let images: Vec<ElementRef<'_>> = dom::elements(doc_a)
        .filter(|e| dom::is_image(*e))
        .filter(|e| !dom::in_header(*e))
        .filter(|e| {
            e.value()
                .attr("src")
                .map(dom::is_raster_source)
                .unwrap_or(false)
        })
        .collect();
    if images.is_empty() {
        tracing::warn!("No plausible comic images on the start page");
        return Err(ScrapeError::NoProvenIdentifier {
            role: "image",
            tried: Vec::new(),
        });
    }

    let qualifying = prober.qualifying(&images, page_a_url)?;
    tracing::debug!(
        plausible = images.len(),
        qualifying = qualifying.len(),
        "Size-probed comic images"
    );

    let mut tried_all = Vec::new();
    for image in &qualifying {
        match validator::prove(
            candidates::candidates_for(*image),
            &qualifying,
            doc_a,
            doc_b,
            "image",
        ) {
            Ok(id) => return Ok(id),
            Err(ScrapeError::NoProvenIdentifier { mut tried, .. }) => {
                tried_all.append(&mut tried);
            }
            Err(e) => return Err(e),
        }
    }
    Err(ScrapeError::NoProvenIdentifier {
        role: "image",
        tried: tried_all,
    })
}

/// Fetch both sample pages and run both inferences.
pub fn infer_identifiers<F: Fetcher, D: ImageDecoder>(
    fetcher: &F,
    decoder: &D,
    start_page: &str,
    next_page: &str,
    min_size: Option<(u32, u32)>,
) -> Result<(Identifier, Identifier), ScrapeError> {
    tracing::info!(%start_page, %next_page, "Inferring identifiers from sample pages");
    let doc_a = dom::parse(&fetcher.fetch(start_page)?);
    let doc_b = dom::parse(&fetcher.fetch(next_page)?);

    let link = infer_link_identifier(&doc_a, start_page, next_page, &doc_b)?;
    tracing::info!(identifier = %link, "Proven link identifier");

    let mut prober = SizeProber::new(fetcher, decoder);
    if let Some((width, height)) = min_size {
        prober = prober.with_min_size(width, height);
    }
    let image = infer_image_identifier(&doc_a, start_page, &doc_b, &prober)?;
    tracing::info!(identifier = %image, "Proven image identifier");

    Ok((link, image))
}
