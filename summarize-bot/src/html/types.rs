//! Type definitions for HTML parsing.

/// Readable content pulled out of a fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    /// The page `<title>`, or a placeholder when the page has none
    pub title: String,
    /// Text of the leading paragraphs, joined with single spaces
    pub content: String,
}

impl ExtractedPage {
    pub fn new(title: String, content: String) -> Self {
        Self { title, content }
    }

    /// Render the page as source material for the article prompt.
    pub fn to_source(&self) -> String {
        format!("Title: {}\n\n{}", self.title, self.content)
    }
}
