//! Completion API integration: prompt template and chat-completions client.

pub mod client;
pub mod prompt;

pub use client::{CompletionClient, CompletionError, CompletionRequest};
pub use prompt::build_article_prompt;
