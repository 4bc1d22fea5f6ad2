//! Compositor: active parts to one renderable SVG document
//!
//! Consumes the resolved parts in layer order plus the palette and emits
//! a standalone document: a style block generated from the palette, one
//! `<g>` layer per part, and a metadata block carrying the union of
//! contributor names, the parts repository source and the CC-BY license
//! notice.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::entities::palette::Palette;
use crate::entities::part::PartLayer;
use crate::svg::CANVAS_SIZE;

const PARTS_SOURCE_URL: &str = "https://github.com/profile-generators/avatar-parts";

/// Escape a string for use as XML text content
fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Build the composed avatar document from parts in layer order
pub fn compose_document(layers: &[Arc<PartLayer>], palette: &Palette) -> String {
    let mut contributors: IndexSet<&str> = IndexSet::new();
    for layer in layers {
        contributors.insert(layer.creator.as_str());
    }
    let contributors = xml_escape(&contributors.into_iter().collect::<Vec<_>>().join(", "));

    let mut doc = String::new();
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    doc.push_str(&format!(
        concat!(
            "<svg width=\"{size}mm\" height=\"{size}mm\" viewBox=\"0 0 {size} {size}\"\n",
            "     version=\"1.1\" id=\"avatar\"\n",
            "     xmlns=\"http://www.w3.org/2000/svg\"\n",
            "     xmlns:cc=\"http://creativecommons.org/ns#\"\n",
            "     xmlns:dc=\"http://purl.org/dc/elements/1.1/\"\n",
            "     xmlns:inkscape=\"http://www.inkscape.org/namespaces/inkscape\"\n",
            "     xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\"\n",
            "     xmlns:xlink=\"http://www.w3.org/1999/xlink\">\n"
        ),
        size = CANVAS_SIZE
    ));

    doc.push_str("<style>\n");
    doc.push_str(&palette.style_rules());
    doc.push_str("</style>\n");

    for layer in layers {
        doc.push_str(&layer.markup);
        doc.push('\n');
    }

    doc.push_str(&format!(
        concat!(
            "<metadata>\n",
            "  <rdf:RDF>\n",
            "    <cc:Work>\n",
            "      <dc:contributor>\n",
            "        <cc:Agent>\n",
            "          <dc:title>{contributors}</dc:title>\n",
            "        </cc:Agent>\n",
            "      </dc:contributor>\n",
            "      <dc:source>{source}</dc:source>\n",
            "    </cc:Work>\n",
            "    <cc:License rdf:about=\"http://creativecommons.org/licenses/by/4.0/\">\n",
            "      <cc:permits rdf:resource=\"http://creativecommons.org/ns#Reproduction\"/>\n",
            "      <cc:permits rdf:resource=\"http://creativecommons.org/ns#Distribution\"/>\n",
            "      <cc:requires rdf:resource=\"http://creativecommons.org/ns#Notice\"/>\n",
            "      <cc:requires rdf:resource=\"http://creativecommons.org/ns#Attribution\"/>\n",
            "      <cc:permits rdf:resource=\"http://creativecommons.org/ns#DerivativeWorks\"/>\n",
            "    </cc:License>\n",
            "  </rdf:RDF>\n",
            "</metadata>\n",
            "</svg>\n"
        ),
        contributors = contributors,
        source = PARTS_SOURCE_URL
    ));

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(id: &str, creator: &str) -> Arc<PartLayer> {
        Arc::new(PartLayer {
            markup: Arc::from(format!("<g id=\"{}\"><path class=\"flesh\"/></g>", id)),
            creator: creator.to_string(),
        })
    }

    #[test]
    fn layers_appear_in_order() {
        let doc = compose_document(
            &[layer("backhair", "ada"), layer("head", "grace")],
            &Palette::default(),
        );
        let backhair = doc.find("id=\"backhair\"").unwrap();
        let head = doc.find("id=\"head\"").unwrap();
        assert!(backhair < head);
    }

    #[test]
    fn contributors_are_a_deduplicated_union() {
        let doc = compose_document(
            &[
                layer("a", "ada"),
                layer("b", "grace"),
                layer("c", "ada"),
            ],
            &Palette::default(),
        );
        assert!(doc.contains("<dc:title>ada, grace</dc:title>"));
    }

    #[test]
    fn palette_styles_are_embedded() {
        let palette = Palette::default();
        let doc = compose_document(&[layer("a", "ada")], &palette);
        assert!(doc.contains("<style>"));
        assert!(doc.contains(".flesh { fill:"));
    }

    #[test]
    fn document_parses_back_as_xml() {
        let doc = compose_document(&[layer("a", "ada"), layer("b", "bob")], &Palette::default());
        roxmltree::Document::parse(&doc).unwrap();
    }

    #[test]
    fn contributor_names_are_xml_escaped() {
        let doc = compose_document(&[layer("a", "a & b <art>")], &Palette::default());
        assert!(doc.contains("a &amp; b &lt;art&gt;"));
        roxmltree::Document::parse(&doc).unwrap();
    }
}
