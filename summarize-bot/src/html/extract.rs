//! HTML parsing utilities for extracting a page title and its leading paragraphs.

use scraper::{Html, Selector};
use tracing::{debug, info};

use super::types::ExtractedPage;

/// Title used when a page has no usable `<title>`.
pub const UNTITLED: &str = "Untitled";

/// Extract the trimmed page title, falling back to [`UNTITLED`].
pub fn extract_title(document: &Html) -> String {
    let selector = Selector::parse("title").expect("Invalid selector");

    document
        .select(&selector)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Extract the text of the first `max_paragraphs` `<p>` elements.
///
/// Each paragraph contributes all of its descendant text, unmodified;
/// paragraphs are joined with a single space.
pub fn extract_paragraphs(document: &Html, max_paragraphs: usize) -> String {
    let selector = Selector::parse("p").expect("Invalid selector");

    let paragraphs: Vec<String> = document
        .select(&selector)
        .take(max_paragraphs)
        .map(|p| p.text().collect::<String>())
        .collect();

    debug!(count = paragraphs.len(), "Extracted paragraphs");
    paragraphs.join(" ")
}

/// Parse raw HTML into the title and paragraph text used as article source.
pub fn extract_page(html: &str, max_paragraphs: usize) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let content = extract_paragraphs(&document, max_paragraphs);

    info!(
        html_length = html.len(),
        title_length = title.len(),
        content_length = content.len(),
        has_title = title != UNTITLED,
        "page_extracted"
    );

    ExtractedPage::new(title, content)
}
