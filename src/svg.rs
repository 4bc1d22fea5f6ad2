//! Part SVG parsing
//!
//! A part file carries exactly one top-level `<g>` graphics layer and one
//! `dc:creator`/`dc:title` metadata node. The layer markup is sliced out
//! of the source text verbatim (node byte ranges), so whatever classes
//! and paths the author exported survive into composed documents
//! untouched.

use std::sync::Arc;

use crate::entities::part::PartLayer;
use crate::error::VisageError;

/// Square part canvas in millimeters, as the part sources are authored
pub const CANVAS_SIZE: &str = "124.19042";

/// Extract the layer markup and creator attribution from part SVG text
pub fn parse_part(text: &str) -> Result<PartLayer, VisageError> {
    let doc =
        roxmltree::Document::parse(text).map_err(|e| VisageError::PartParse(e.to_string()))?;

    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(VisageError::PartParse(format!(
            "root element is <{}>, expected <svg>",
            root.tag_name().name()
        )));
    }

    let layer = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "g")
        .ok_or_else(|| VisageError::PartParse("no top-level <g> layer".into()))?;
    let markup = &text[layer.range()];

    let creator = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "creator")
        .and_then(|creator| {
            creator
                .descendants()
                .find(|n| n.is_element() && n.tag_name().name() == "title")
        })
        .and_then(|title| title.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| VisageError::PartParse("no creator title metadata".into()))?;

    Ok(PartLayer {
        markup: Arc::from(markup),
        creator,
    })
}
