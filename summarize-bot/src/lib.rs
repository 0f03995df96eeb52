//! Summarize bot - Slack slash command that drafts news articles.
//!
//! `/summarize <text or URL>` turns a snippet, or the readable part of a web
//! page, into a short news-style draft written by a chat completion model.
//!
//! ## Architecture
//!
//! ```text
//! Slack → POST /summarize → signature check → [page fetch → extract] → completion → Slack reply
//! ```

pub mod config;
pub mod fetch;
pub mod html;
pub mod llm;
pub mod summarize;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use summarize::{SlackResponse, Summarizer};
pub use web::{router, AppState};
