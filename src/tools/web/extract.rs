//! Visible-text extraction from HTML
//!
//! Text nodes are concatenated verbatim in document order; no layout is
//! reconstructed. Content of non-rendered elements is dropped.

use scraper::{Html, Node};

/// Elements whose text content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract the visible text of an HTML document
#[must_use]
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::with_capacity(html.len() / 4);

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()))
        });

        if !hidden {
            out.push_str(text);
        }
    }

    out
}
