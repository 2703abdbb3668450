//! Cross-page candidate validation.
//!
//! A candidate is *sound* when everything it matches on the reference page is
//! ground truth, and it *generalizes* when it still matches something on a
//! second page. The first candidate (in generation order) that does both is
//! the proven identifier; there is no specificity ranking beyond that order.

use scraper::{ElementRef, Html};

use crate::error::ScrapeError;
use crate::identifier::Identifier;

/// Filter `candidates` down to the first sound-and-generalizing one.
///
/// Soundness tolerates false negatives on page A: a candidate need not match
/// every node of the valid set, but a single match outside it is a rejection.
/// Candidates matching nothing at all on page A are rejected as well, since
/// an identifier that cannot find its own target proves nothing.
pub fn prove(
    candidates: Vec<Identifier>,
    valid_set: &[ElementRef<'_>],
    doc_a: &Html,
    doc_b: &Html,
    role: &'static str,
) -> Result<Identifier, ScrapeError> {
    let mut tried = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let found_a = candidate.identify(doc_a);
        if found_a.is_empty() {
            tracing::debug!(%candidate, "Rejected: no matches on reference page");
            tried.push(candidate.to_string());
            continue;
        }
        if found_a.iter().any(|node| !valid_set.contains(node)) {
            tracing::debug!(%candidate, "Rejected: false positive on reference page");
            tried.push(candidate.to_string());
            continue;
        }
        if candidate.identify(doc_b).is_empty() {
            tracing::debug!(%candidate, "Rejected: does not generalize to second page");
            tried.push(candidate.to_string());
            continue;
        }
        tracing::debug!(%candidate, %role, "Proven identifier");
        return Ok(candidate);
    }

    Err(ScrapeError::NoProvenIdentifier { role, tried })
}
