//! HTML flattening

use scraper::{Html, Node};

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Flatten an HTML document into its visible text.
///
/// Text nodes are trimmed and joined with a single space, so adjacent cells
/// such as `<td>11.01</td><td>2025</td>` never merge into one token.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let pieces: Vec<&str> = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let Node::Text(text) = node.value() else {
                return None;
            };
            let hidden = node
                .ancestors()
                .filter_map(|ancestor| ancestor.value().as_element())
                .any(|element| HIDDEN_ELEMENTS.contains(&element.name()));
            if hidden {
                return None;
            }
            let trimmed = text.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .collect();

    pieces.join(" ")
}
