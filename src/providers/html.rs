//! Visible-text extraction for announcement pages.
//!
//! `scraper` documents are `!Send`, so everything here is synchronous and the
//! parsed document never outlives the call.

use scraper::{Html, Selector};

/// Containers that hold the announcement body, most specific first.
const CONTAINER_SELECTORS: [&str; 3] = ["main#main-content", "article", "div.content"];

/// Returns the text of the page's main content container, with every text
/// node trimmed and joined by a single space. `None` when the page has no
/// recognisable container.
pub fn body_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let container = CONTAINER_SELECTORS.iter().find_map(|selector| {
        Selector::parse(selector)
            .ok()
            .and_then(|sel| document.select(&sel).next())
    })?;

    let text = container
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Some(text)
}
