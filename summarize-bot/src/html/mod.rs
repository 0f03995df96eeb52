//! HTML parsing for fetched article pages.

pub mod extract;
pub mod types;

pub use extract::{extract_page, extract_paragraphs, extract_title, UNTITLED};
pub use types::ExtractedPage;
