//! Article drafting pipeline.
//!
//! ## Processing Flow
//!
//! ```text
//! text ─┬─ URL ──→ fetch → extract ─┬→ prompt → completion → SlackResponse
//!       └─ free text ───────────────┘
//! ```
//!
//! Every failure ends the pipeline with an ephemeral reply; nothing is retried.

pub mod response;

use tracing::{info, warn};

use crate::config::Config;
use crate::fetch::{FetchError, PageFetcher};
use crate::html::extract_page;
use crate::llm::{build_article_prompt, CompletionClient, CompletionError, CompletionRequest};

pub use response::{ResponseType, SlackResponse};

/// Reply for an empty command.
pub const EMPTY_INPUT_MESSAGE: &str = "Please provide text to summarize.";

/// What the user passed to the slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizeInput {
    Empty,
    Url(String),
    Text(String),
}

impl SummarizeInput {
    /// Classify raw command text. Anything starting with `http` is a URL.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            SummarizeInput::Empty
        } else if text.starts_with("http") {
            SummarizeInput::Url(text.to_string())
        } else {
            SummarizeInput::Text(text.to_string())
        }
    }
}

/// Completion settings applied to every request.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub model_label: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            model_label: config.model_label.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Turns command text into a drafted article.
///
/// Holds the process-wide HTTP clients; built once at startup and shared by
/// every request.
#[derive(Clone)]
pub struct Summarizer {
    fetcher: PageFetcher,
    completion: CompletionClient,
    settings: CompletionSettings,
    max_paragraphs: usize,
}

impl Summarizer {
    pub fn new(
        fetcher: PageFetcher,
        completion: CompletionClient,
        settings: CompletionSettings,
        max_paragraphs: usize,
    ) -> Self {
        Self {
            fetcher,
            completion,
            settings,
            max_paragraphs,
        }
    }

    /// Run the full pipeline and build the Slack reply.
    pub async fn summarize(&self, text: &str) -> SlackResponse {
        let source = match SummarizeInput::parse(text) {
            SummarizeInput::Empty => {
                info!("summarize_empty_input");
                return SlackResponse::ephemeral(EMPTY_INPUT_MESSAGE);
            }
            SummarizeInput::Url(url) => match self.fetch_source(&url).await {
                Ok(source) => source,
                Err(e) => {
                    warn!(url = %url, error = %e, "summarize_fetch_failed");
                    return SlackResponse::ephemeral(format!("Failed to fetch URL: {}", e));
                }
            },
            SummarizeInput::Text(text) => {
                info!(text_length = text.len(), "summarize_using_text");
                text
            }
        };

        match self.draft_article(&source).await {
            Ok(story) => SlackResponse::in_channel(format!(
                "*Summary by {}:*\n{}",
                self.settings.model_label, story
            )),
            Err(e) => {
                warn!(error = %e, "summarize_completion_failed");
                SlackResponse::ephemeral(format!("Something went wrong: {}", e))
            }
        }
    }

    /// Fetch a page and render its title and paragraphs as source material.
    pub async fn fetch_source(&self, url: &str) -> Result<String, FetchError> {
        let html = self.fetcher.fetch(url).await?;
        let page = extract_page(&html, self.max_paragraphs);
        Ok(page.to_source())
    }

    /// Ask the completion service for an article about `source`.
    pub async fn draft_article(&self, source: &str) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            prompt: build_article_prompt(source),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        self.completion.complete(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    const COMPLETION_BODY: &str = r#"{
        "model": "gpt-3.5-turbo",
        "choices": [{"message": {"role": "assistant", "content": "Fund Expands\n\nWhy it matters: growth."}}]
    }"#;

    fn summarizer(completion_url: String) -> Summarizer {
        Summarizer::new(
            PageFetcher::new(None, Duration::from_secs(5), None).unwrap(),
            CompletionClient::new(completion_url, "sk-test", Duration::from_secs(5)).unwrap(),
            CompletionSettings::from_config(&Config::default()),
            10,
        )
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(SummarizeInput::parse(""), SummarizeInput::Empty);
        assert_eq!(SummarizeInput::parse("   \n"), SummarizeInput::Empty);
        assert_eq!(
            SummarizeInput::parse(" https://example.com/story "),
            SummarizeInput::Url("https://example.com/story".to_string())
        );
        assert_eq!(
            SummarizeInput::parse("http://example.com"),
            SummarizeInput::Url("http://example.com".to_string())
        );
        assert_eq!(
            SummarizeInput::parse("Sovereign fund announces new investment"),
            SummarizeInput::Text("Sovereign fund announces new investment".to_string())
        );
    }

    #[tokio::test]
    async fn test_summarize_empty_input() {
        let response = summarizer("http://127.0.0.1:9/unused".to_string())
            .summarize("  ")
            .await;
        assert_eq!(response, SlackResponse::ephemeral(EMPTY_INPUT_MESSAGE));
    }

    #[tokio::test]
    async fn test_summarize_text_goes_straight_to_completion() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::Regex(
                r"Here is the source content:\\nSovereign fund announces new investment".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(COMPLETION_BODY)
            .create_async()
            .await;

        let response = summarizer(server.url())
            .summarize("Sovereign fund announces new investment")
            .await;

        assert_eq!(
            response,
            SlackResponse::in_channel(
                "*Summary by GPT-3.5-turbo:*\nFund Expands\n\nWhy it matters: growth."
            )
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_summarize_url_uses_extracted_page() {
        let mut server = Server::new_async().await;
        let page = server
            .mock("GET", "/story")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><title>PIF deal</title><p>One.</p><p>Two.</p></html>")
            .create_async()
            .await;
        let completion = server
            .mock("POST", "/complete")
            .match_body(Matcher::Regex(r"Title: PIF deal\\n\\nOne. Two.".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(COMPLETION_BODY)
            .create_async()
            .await;

        let response = summarizer(format!("{}/complete", server.url()))
            .summarize(&format!("{}/story", server.url()))
            .await;

        assert_eq!(response.response_type, ResponseType::InChannel);
        page.assert_async().await;
        completion.assert_async().await;
    }

    #[tokio::test]
    async fn test_summarize_fetch_failure_skips_completion() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/report.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .create_async()
            .await;
        let completion = server
            .mock("POST", "/complete")
            .expect(0)
            .create_async()
            .await;

        let response = summarizer(format!("{}/complete", server.url()))
            .summarize(&format!("{}/report.pdf", server.url()))
            .await;

        assert_eq!(response.response_type, ResponseType::Ephemeral);
        assert_eq!(
            response.text,
            "Failed to fetch URL: expected an HTML page but got content type 'application/pdf'"
        );
        completion.assert_async().await;
    }

    #[tokio::test]
    async fn test_summarize_completion_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let response = summarizer(server.url()).summarize("Some news").await;

        assert_eq!(
            response,
            SlackResponse::ephemeral(
                "Something went wrong: completion API error 500: upstream exploded"
            )
        );
    }
}
