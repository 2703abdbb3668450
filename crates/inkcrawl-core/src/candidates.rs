//! Candidate generation for a concrete target node.
//!
//! Generation order is load-bearing: the cross-page validator returns the
//! first surviving candidate, so the order here encodes priority. Own-node
//! attributes come first, then ancestor-derived rules, then text and
//! image-based rules.

use scraper::ElementRef;

use crate::dom;
use crate::identifier::Identifier;

/// Attributes considered stable enough to identify an element by.
pub const COMMON_ATTRIBUTES: [&str; 3] = ["class", "id", "rel"];

/// One Attribute candidate per common attribute present on the node.
pub fn common_identifiers(node: ElementRef<'_>) -> Vec<Identifier> {
    let name = node.value().name();
    COMMON_ATTRIBUTES
        .iter()
        .filter_map(|attr| {
            node.value()
                .attr(attr)
                .map(|value| Identifier::attribute(name, attr, value))
        })
        .collect()
}

/// Every candidate rule for identifying `node`, in priority order.
///
/// 1. Own common attributes (class, id, rel).
/// 2. One `AncestorMatch` per ancestor root-ward, wrapping the ancestor's
///    common identifiers; ancestors with none are skipped.
/// 3. `Member(text)` when the node has text.
/// 4. `Attribute(src)` when the node carries a source itself.
/// 5. One `SubImage` per strict-descendant image source.
pub fn candidates_for(node: ElementRef<'_>) -> Vec<Identifier> {
    let name = node.value().name();
    let mut candidates = common_identifiers(node);

    for ancestor in dom::ancestors(node) {
        let inherited = common_identifiers(ancestor);
        if !inherited.is_empty() {
            candidates.push(Identifier::ancestor_match(name, inherited));
        }
    }

    let text = dom::text(node);
    if !text.is_empty() {
        candidates.push(Identifier::member(name, "text", &text));
    }

    if let Some(src) = node.value().attr("src") {
        candidates.push(Identifier::attribute(name, "src", src));
    }

    for image in dom::descendant_images(node) {
        if let Some(src) = image.value().attr("src") {
            candidates.push(Identifier::sub_image(name, src));
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Strategy;
    use scraper::Html;

    fn first_element<'a>(doc: &'a Html, tag: &str) -> ElementRef<'a> {
        dom::elements(doc).find(|e| e.value().name() == tag).unwrap()
    }

    #[test]
    fn test_common_identifiers_only_present_attributes() {
        let doc = Html::parse_document(r#"<a class="nav" rel="next" href="x">Next</a>"#);
        let anchor = first_element(&doc, "a");
        let ids = common_identifiers(anchor);
        assert_eq!(
            ids,
            vec![
                Identifier::attribute("a", "class", "nav"),
                Identifier::attribute("a", "rel", "next"),
            ]
        );
    }

    #[test]
    fn test_class_candidates_precede_text() {
        let doc = Html::parse_document(r#"<a class="nav-next" href="b.html">Next</a>"#);
        let anchor = first_element(&doc, "a");
        let candidates = candidates_for(anchor);
        let class_pos = candidates
            .iter()
            .position(|c| matches!(&c.strategy, Strategy::Attribute { attr, .. } if attr == "class"))
            .unwrap();
        let text_pos = candidates
            .iter()
            .position(|c| matches!(&c.strategy, Strategy::Member { .. }))
            .unwrap();
        assert!(class_pos < text_pos);
    }

    #[test]
    fn test_ancestor_candidates_wrap_common_identifiers() {
        let doc = Html::parse_document(
            r#"<div id="comic" class="wrap"><p><img src="strip.png"></p></div>"#,
        );
        let img = first_element(&doc, "img");
        let candidates = candidates_for(img);

        // The bare <p> and <body>/<html> ancestors have no common attributes,
        // so exactly one AncestorMatch is produced, for the div.
        let ancestor_rules: Vec<_> = candidates
            .iter()
            .filter(|c| matches!(c.strategy, Strategy::AncestorMatch { .. }))
            .collect();
        assert_eq!(ancestor_rules.len(), 1);
        assert_eq!(
            *ancestor_rules[0],
            Identifier::ancestor_match(
                "img",
                vec![
                    Identifier::attribute("div", "class", "wrap"),
                    Identifier::attribute("div", "id", "comic"),
                ],
            )
        );
        assert_eq!(ancestor_rules[0].name, "img");
    }

    #[test]
    fn test_image_node_gets_src_candidate() {
        let doc = Html::parse_document(r#"<img src="strip.png">"#);
        let img = first_element(&doc, "img");
        let candidates = candidates_for(img);
        assert!(candidates.contains(&Identifier::attribute("img", "src", "strip.png")));
    }

    #[test]
    fn test_anchor_wrapping_image_gets_sub_image_candidate() {
        let doc = Html::parse_document(r#"<a href="b.html"><img src="buttons/next.png"></a>"#);
        let anchor = first_element(&doc, "a");
        let candidates = candidates_for(anchor);
        assert!(candidates.contains(&Identifier::sub_image("a", "buttons/next.png")));
        // No text, so no member candidate.
        assert!(
            !candidates
                .iter()
                .any(|c| matches!(c.strategy, Strategy::Member { .. }))
        );
    }
}
