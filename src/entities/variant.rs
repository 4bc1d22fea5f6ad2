//! Variant descriptors and listing parsing
//!
//! A category listing is an HTML index whose anchors each carry the
//! variant's stable name (href), space-separated tags and a creator
//! attribution. Anchor order defines variant index order.
//!
//! Stable names encode a numeric ordinal (`hair_0012_fluffy.svg` -> 12).
//! It is parsed exactly once here, at listing time; for back-hair
//! variants the ordinal is the hair-index threshold at which the variant
//! becomes active (see [`crate::core::align`]).

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

/// One selectable asset option within a category. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    /// Stable name, also the asset path segment
    pub name: String,
    pub tags: Vec<String>,
    /// Attribution string, carried into composed documents
    pub creator: String,
    /// Numeric field encoded in the stable name, if present
    pub ordinal: Option<u32>,
}

impl VariantDescriptor {
    pub fn new(name: impl Into<String>, tags: Vec<String>, creator: impl Into<String>) -> Self {
        let name = name.into();
        let ordinal = parse_ordinal(&name);
        Self {
            name,
            tags,
            creator: creator.into(),
            ordinal,
        }
    }
}

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<a\s[^>]*>").unwrap());
static HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href\s*=\s*"([^"]*)""#).unwrap());
static TAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"data-tags\s*=\s*"([^"]*)""#).unwrap());
static CREATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-creator\s*=\s*"([^"]*)""#).unwrap());
static ORDINAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^_]+_([0-9]+)").unwrap());

/// Extract the numeric ordinal from a stable name
pub fn parse_ordinal(name: &str) -> Option<u32> {
    ORDINAL_RE
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse a category listing into ordered variant descriptors.
///
/// Anchors missing any of the three attributes are skipped with a
/// warning; the remaining anchors keep their document order.
pub fn parse_listing(category: &str, html: &str) -> Vec<VariantDescriptor> {
    let mut variants = Vec::new();

    for anchor in ANCHOR_RE.find_iter(html) {
        let tag = anchor.as_str();
        let href = HREF_RE.captures(tag).map(|c| c[1].to_string());
        let tags = TAGS_RE.captures(tag).map(|c| c[1].to_string());
        let creator = CREATOR_RE.captures(tag).map(|c| c[1].to_string());

        let (Some(name), Some(tags), Some(creator)) = (href, tags, creator) else {
            warn!("{}: skipping listing anchor without variant attributes", category);
            continue;
        };

        let tags = tags
            .split_whitespace()
            .map(|t| t.to_string())
            .collect::<Vec<_>>();
        variants.push(VariantDescriptor::new(name, tags, creator));
    }

    variants
}
