//! Serializable DOM-element identification rules.
//!
//! An [`Identifier`] pairs a tag name with one predicate [`Strategy`]. The
//! strategies form a closed tagged union so tests can compare identifiers
//! structurally and serde can round-trip them losslessly, including the
//! recursive `AncestorMatch` variant.

use std::fmt;

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

use crate::dom;

/// Predicate strategy over a single DOM node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "params", rename_all = "kebab-case")]
pub enum Strategy {
    /// Node has `attr` equal to `value`.
    Attribute { attr: String, value: String },

    /// Node's named property equals `value`. The only supported member is
    /// `text`, the concatenated descendant text.
    Member { member: String, value: String },

    /// Node has a strict-descendant `<img>` whose `src` equals `value`.
    SubImage { value: String },

    /// Some ancestor of the node satisfies any of the nested identifiers.
    ///
    /// The nesting is tree-shaped and bounded by DOM depth; ancestors form a
    /// simple chain, so it can never be cyclic.
    AncestorMatch { any_of: Vec<Identifier> },
}

/// A named, serializable rule deciding whether a node is "the" target element.
///
/// Serializes as `{name, strategy, params}` with `params` nesting recursively
/// for `AncestorMatch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// Expected tag name, e.g. `a` or `img`.
    pub name: String,
    #[serde(flatten)]
    pub strategy: Strategy,
}

impl Identifier {
    pub fn attribute(name: &str, attr: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            strategy: Strategy::Attribute {
                attr: attr.to_string(),
                value: value.to_string(),
            },
        }
    }

    pub fn member(name: &str, member: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            strategy: Strategy::Member {
                member: member.to_string(),
                value: value.to_string(),
            },
        }
    }

    pub fn sub_image(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            strategy: Strategy::SubImage {
                value: value.to_string(),
            },
        }
    }

    pub fn ancestor_match(name: &str, any_of: Vec<Identifier>) -> Self {
        Self {
            name: name.to_string(),
            strategy: Strategy::AncestorMatch { any_of },
        }
    }

    /// Whether the strategy predicate holds for `node`, ignoring the tag name.
    pub fn matches(&self, node: ElementRef<'_>) -> bool {
        match &self.strategy {
            Strategy::Attribute { attr, value } => node.value().attr(attr) == Some(value.as_str()),
            Strategy::Member { member, value } => match member.as_str() {
                "text" => dom::text(node) == *value,
                _ => false,
            },
            Strategy::SubImage { value } => dom::descendant_images(node)
                .any(|img| img.value().attr("src") == Some(value.as_str())),
            Strategy::AncestorMatch { any_of } => dom::ancestors(node)
                .any(|ancestor| any_of.iter().any(|id| id.validate(ancestor))),
        }
    }

    /// Full check: predicate holds and the tag name matches.
    pub fn validate(&self, node: ElementRef<'_>) -> bool {
        self.matches(node) && node.value().name() == self.name
    }

    /// All validating elements of the document, in document order.
    pub fn identify<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        dom::elements(doc).filter(|node| self.validate(*node)).collect()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.strategy {
            Strategy::Attribute { attr, value } => {
                write!(f, "[{}:attribute({attr}={value})]", self.name)
            }
            Strategy::Member { member, value } => {
                write!(f, "[{}:member({member}={value})]", self.name)
            }
            Strategy::SubImage { value } => write!(f, "[{}:sub-image({value})]", self.name),
            Strategy::AncestorMatch { any_of } => {
                write!(f, "[{}:ancestor-match(", self.name)?;
                for (i, id) in any_of.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{id}")?;
                }
                write!(f, ")]")
            }
        }
    }
}
