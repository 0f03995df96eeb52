//! Editorial prompt for drafting a news article.

/// Instructions sent ahead of the source content.
const ARTICLE_INSTRUCTIONS: &str = "\
Write a 3–5 paragraph news-style draft article suitable for publication on https://circuit.news. \
Use a clear and engaging headline that reflects the news value. The article should include key facts, \
reporting details, and context that would be relevant to a readership focused on business in the \
Middle East, sovereign wealth funds, diplomacy, and regional strategy.

Avoid bullet points or numbering. Use a professional journalistic tone with concise, factual writing. \
The final paragraph(s) should include a section labeled \"Why it matters\" that explains the broader \
implications of the story for readers in the region or those following economic and political trends.";

/// Build the article prompt for the given source content.
///
/// `source` is either the user's free text or a fetched page rendered with
/// [`crate::html::ExtractedPage::to_source`].
pub fn build_article_prompt(source: &str) -> String {
    format!(
        "{}\n\nHere is the source content:\n{}\n",
        ARTICLE_INSTRUCTIONS, source
    )
}
