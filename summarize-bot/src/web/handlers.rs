//! Slash-command endpoint handlers.
//!
//! The summarize handler:
//! 1. Verifies the Slack signature over the raw body (when enforced)
//! 2. Decodes the `text` form field from the same bytes
//! 3. Runs the drafting pipeline and replies with a Slack envelope
//!
//! Fetch and completion failures are answered with HTTP 200 and an
//! ephemeral message; only authentication failures use an error status.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::fetch::PageFetcher;
use crate::llm::CompletionClient;
use crate::summarize::{CompletionSettings, Summarizer};
use crate::web::signature::{
    is_timestamp_fresh, verify_slack_signature, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use crate::Config;

/// Plain-text body of the health check.
pub const HEALTH_MESSAGE: &str = "Summarize bot is running!";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub summarizer: Summarizer,
}

impl AppState {
    pub fn new(config: Config, summarizer: Summarizer) -> Self {
        Self {
            config: Arc::new(config),
            summarizer,
        }
    }

    /// Build the HTTP clients once and wrap them with the configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = PageFetcher::from_config(&config).context("Failed to create page fetcher")?;
        let completion =
            CompletionClient::from_config(&config).context("Failed to create completion client")?;
        let summarizer = Summarizer::new(
            fetcher,
            completion,
            CompletionSettings::from_config(&config),
            config.max_paragraphs,
        );

        Ok(Self::new(config, summarizer))
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check endpoint.
pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}

// =============================================================================
// Slash Command
// =============================================================================

/// `/summarize` slash-command endpoint.
///
/// Takes the body as raw bytes so the signature is computed over exactly
/// what Slack sent.
pub async fn summarize(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if state.config.enforce_authentication && !is_authentic(&state.config, &headers, &body) {
        warn!(body_length = body.len(), "summarize_unauthorized");
        return (StatusCode::FORBIDDEN, "Unauthorized").into_response();
    }

    let text = form_text(&body);

    info!(
        text_length = text.len(),
        is_url = text.trim().starts_with("http"),
        "summarize_request_received"
    );

    let response = state.summarizer.summarize(&text).await;

    info!(response_type = ?response.response_type, "summarize_request_complete");

    Json(response).into_response()
}

/// Check the Slack signature headers against the raw body.
fn is_authentic(config: &Config, headers: &HeaderMap, body: &[u8]) -> bool {
    let secret = config.slack_signing_secret.as_deref().unwrap_or_default();
    let timestamp = header_str(headers, TIMESTAMP_HEADER);
    let signature = header_str(headers, SIGNATURE_HEADER);

    verify_slack_signature(secret, timestamp, body, signature)
        && timestamp.is_some_and(|t| is_timestamp_fresh(t, config.slack_signature_max_age))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Decode the `text` field of a form-encoded body; missing means empty.
fn form_text(body: &[u8]) -> String {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "text")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
