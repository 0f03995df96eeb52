//! OpenAI-compatible chat completions client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;

/// Failures from the completion provider.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("completion request timed out after {0}ms")]
    Timeout(u128),

    #[error("completion request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("completion API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse completion response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("completion response has no choices")]
    NoChoices,
}

/// A single-prompt completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat completions client, built once at startup.
#[derive(Clone)]
pub struct CompletionClient {
    api_url: String,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl CompletionClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .no_proxy()
            .build()
            .map_err(CompletionError::Client)?;

        Ok(Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout,
            client,
        })
    }

    /// Create a client from the application configuration.
    ///
    /// A missing API key is caught by [`Config::validate`] at startup; here it
    /// yields a client whose calls fail with an authentication error.
    pub fn from_config(config: &Config) -> Result<Self, CompletionError> {
        Self::new(
            config.openai_api_url.clone(),
            config.openai_api_key.clone().unwrap_or_default(),
            config.completion_timeout(),
        )
    }

    /// Run one completion and return the trimmed generated text.
    pub async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        info!(
            model = %request.model,
            prompt_length = request.prompt.len(),
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "completion_request_starting"
        );

        let req_body = ChatRequest {
            model: request.model,
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        // The deadline covers the whole exchange, body included.
        let resp_body = tokio::time::timeout(self.timeout, self.exchange(&req_body))
            .await
            .map_err(|_| {
                error!(timeout_seconds = self.timeout.as_secs_f64(), "completion_request_timeout");
                CompletionError::Timeout(self.timeout.as_millis())
            })??;

        let choice = resp_body
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::NoChoices)?;

        let text = choice.message.content.unwrap_or_default().trim().to_string();

        info!(
            model = resp_body.model.as_deref().unwrap_or_default(),
            output_length = text.len(),
            "completion_request_complete"
        );

        Ok(text)
    }

    /// Send the request, check the status and decode the body.
    async fn exchange(&self, req_body: &ChatRequest) -> Result<ChatResponse, CompletionError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(req_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "completion_request_error");
                CompletionError::Request(e)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(status_code = status, error = %e, "completion_api_error_body_unreadable");
                    String::new()
                }
            };
            error!(status_code = status, body = %body, "completion_api_error");
            return Err(CompletionError::Api { status, body });
        }

        response.json().await.map_err(|e| {
            error!(error = %e, "completion_decode_error");
            CompletionError::Decode(e)
        })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
