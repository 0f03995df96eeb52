//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup; there is no reload.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Default outbound proxy used for page fetches.
pub const DEFAULT_PROXY_HOST: &str = "rp.scrapegw.com:6060";

/// Default OpenAI-compatible chat completions endpoint.
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Slack signing secret for HMAC signature verification
    pub slack_signing_secret: Option<String>,

    /// Whether inbound requests must carry a valid Slack signature
    pub enforce_authentication: bool,

    /// Maximum age in seconds for Slack request timestamps (0 disables the check)
    pub slack_signature_max_age: u64,

    /// Residential proxy credentials and host for page fetches
    pub proxy: Option<ProxyConfig>,

    /// Page fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,

    /// Number of `<p>` elements kept from a fetched page
    pub max_paragraphs: usize,

    /// Optional pool of user agents to rotate through
    pub user_agent_pool: Option<Vec<String>>,

    // =========================================================================
    // Completion API
    // =========================================================================

    pub openai_api_key: Option<String>,

    pub openai_api_url: String,

    pub model: String,

    /// Human-readable model name shown in the Slack reply
    pub model_label: String,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Completion call timeout in milliseconds
    pub completion_timeout_ms: u64,
}

/// Outbound proxy settings.
#[derive(Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
}

impl ProxyConfig {
    /// Proxy URL without credentials, safe to log.
    pub fn url(&self) -> String {
        format!("http://{}", self.host)
    }
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Startup configuration problems.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ENFORCE_AUTHENTICATION is on but SLACK_SIGNING_SECRET is not set")]
    MissingSigningSecret,

    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: parse_or("PORT", 5000),

            slack_signing_secret: non_empty("SLACK_SIGNING_SECRET"),

            enforce_authentication: parse_bool("ENFORCE_AUTHENTICATION", true),

            slack_signature_max_age: parse_or("SLACK_SIGNATURE_MAX_AGE", 300), // 5 minutes default

            proxy: match (non_empty("PROXY_USER"), non_empty("PROXY_PASS")) {
                (Some(user), Some(pass)) => Some(ProxyConfig {
                    host: non_empty("PROXY_HOST").unwrap_or_else(|| DEFAULT_PROXY_HOST.to_string()),
                    user,
                    pass,
                }),
                (Some(_), None) | (None, Some(_)) => {
                    warn!("Only one of PROXY_USER/PROXY_PASS is set, fetching without proxy");
                    None
                }
                (None, None) => None,
            },

            fetch_timeout_ms: parse_or("FETCH_TIMEOUT_MS", 30_000),

            max_paragraphs: parse_or("MAX_PARAGRAPHS", 10),

            user_agent_pool: parse_csv("USER_AGENT_POOL"),

            openai_api_key: non_empty("OPENAI_API_KEY"),

            openai_api_url: non_empty("OPENAI_API_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),

            model: non_empty("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),

            model_label: non_empty("MODEL_LABEL").unwrap_or_else(|| "GPT-3.5-turbo".to_string()),

            temperature: parse_or("COMPLETION_TEMPERATURE", 0.7),

            max_tokens: parse_or("COMPLETION_MAX_TOKENS", 400),

            completion_timeout_ms: parse_or("COMPLETION_TIMEOUT_MS", 60_000),
        }
    }

    /// Check that the configuration can serve requests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enforce_authentication && self.slack_signing_secret.is_none() {
            return Err(ConfigError::MissingSigningSecret);
        }
        if self.openai_api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }
}

impl Default for Config {
    /// Built-in defaults with no secrets configured and authentication enforced.
    fn default() -> Self {
        Config {
            port: 5000,
            slack_signing_secret: None,
            enforce_authentication: true,
            slack_signature_max_age: 300,
            proxy: None,
            fetch_timeout_ms: 30_000,
            max_paragraphs: 10,
            user_agent_pool: None,
            openai_api_key: None,
            openai_api_url: DEFAULT_OPENAI_API_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            model_label: "GPT-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 400,
            completion_timeout_ms: 60_000,
        }
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when unset or invalid.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match non_empty(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Parse a boolean flag such as "true", "0" or "off".
fn parse_bool(name: &str, default: bool) -> bool {
    let raw = match non_empty(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean, using default");
            default
        }
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}
