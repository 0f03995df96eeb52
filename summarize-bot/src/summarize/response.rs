//! Slack slash-command response envelope.

use serde::Serialize;

/// Who sees the reply in Slack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only the user who ran the command.
    Ephemeral,
    /// Everyone in the channel.
    InChannel,
}

/// JSON body returned to Slack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackResponse {
    pub response_type: ResponseType,
    pub text: String,
}

impl SlackResponse {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
        }
    }

    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            text: text.into(),
        }
    }
}
