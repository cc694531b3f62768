//! Build a `Document` from HTML markup
//!
//! Only element structure and the `class`/`style` attributes are
//! materialized; text nodes carry no geometry in this model and are skipped.

use scraper::{ElementRef, Html};

use crate::dom::{style, Document, NodeId};
use crate::error::{Error, Result};
use crate::Viewport;

impl Document {
    /// Parse markup and materialize the `<body>` subtree as an element tree
    /// sized by `viewport`. Inline `style` attributes must parse; see
    /// [`style::parse_inline`].
    pub fn from_html(html: &str, viewport: Viewport) -> Result<Document> {
        let parsed = Html::parse_document(html);
        let mut doc = Document::new(viewport);
        let body_selector = scraper::Selector::parse("body")
            .map_err(|e| Error::ParseError(format!("{e:?}")))?;
        if let Some(body) = parsed.select(&body_selector).next() {
            let root = doc.root();
            apply_attrs(&mut doc, root, &body)?;
            for child in body.children() {
                if let Some(element) = ElementRef::wrap(child) {
                    build(&mut doc, root, &element)?;
                }
            }
        }
        Ok(doc)
    }
}

fn build(doc: &mut Document, parent: NodeId, element: &ElementRef) -> Result<()> {
    let id = doc.create_element(element.value().name());
    apply_attrs(doc, id, element)?;
    doc.append_child(parent, id)?;
    for child in element.children() {
        if let Some(nested) = ElementRef::wrap(child) {
            build(doc, id, &nested)?;
        }
    }
    Ok(())
}

fn apply_attrs(doc: &mut Document, id: NodeId, element: &ElementRef) -> Result<()> {
    if let Some(class) = element.value().attr("class") {
        doc.set_class(id, class)?;
    }
    if let Some(text) = element.value().attr("style") {
        let parsed = style::parse_inline(text)?;
        doc.set_style(id, |s| *s = parsed)?;
    }
    Ok(())
}
