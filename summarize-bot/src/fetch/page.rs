//! Article page fetcher.
//!
//! One GET per request, routed through the residential proxy when one is
//! configured, bounded by the fetch timeout. Failures are never retried.

use std::time::Duration;

use reqwest::{
    header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT},
    Client, Proxy,
};
use thiserror::Error;
use tracing::{error, info, warn};

use super::user_agent::choose_user_agent;
use crate::config::{Config, ProxyConfig};

/// Reasons a page could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid proxy configuration: {0}")]
    Proxy(#[source] reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request timed out after {timeout_ms}ms: {source}")]
    Timeout {
        timeout_ms: u128,
        #[source]
        source: reqwest::Error,
    },

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("expected an HTML page but got content type '{0}'")]
    NotHtml(String),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Fetches raw HTML for article URLs.
///
/// Built once at startup and shared by every request.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
    user_agent_pool: Option<Vec<String>>,
}

impl PageFetcher {
    /// Create a fetcher with an explicit proxy and timeout.
    pub fn new(
        proxy: Option<&ProxyConfig>,
        timeout: Duration,
        user_agent_pool: Option<Vec<String>>,
    ) -> Result<Self, FetchError> {
        let builder = match proxy {
            Some(proxy) => {
                let proxy = Proxy::all(proxy.url())
                    .map_err(FetchError::Proxy)?
                    .basic_auth(&proxy.user, &proxy.pass);
                Client::builder().proxy(proxy)
            }
            None => Client::builder().no_proxy(),
        };

        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self {
            client,
            timeout,
            user_agent_pool,
        })
    }

    /// Create a fetcher from the application configuration.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            config.proxy.as_ref(),
            config.fetch_timeout(),
            config.user_agent_pool.clone(),
        )
    }

    /// Fetch a page and return its body as text.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!(
            url = url,
            timeout_seconds = self.timeout.as_secs_f64(),
            "page_fetch_starting"
        );

        let request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(USER_AGENT, choose_user_agent(self.user_agent_pool.as_deref()))
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                error!(url = url, timeout_seconds = self.timeout.as_secs_f64(), error = %e, "page_fetch_timeout");
                FetchError::Timeout {
                    timeout_ms: self.timeout.as_millis(),
                    source: e,
                }
            } else {
                error!(url = url, error = %e, "page_fetch_request_error");
                FetchError::Request(e)
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        if let Some(content_type) = content_type.as_deref() {
            if !is_html_content_type(content_type) {
                warn!(url = url, status_code = status, content_type = content_type, "page_fetch_not_html");
                return Err(FetchError::NotHtml(content_type.to_string()));
            }
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                error!(url = url, error = %e, "page_fetch_body_timeout");
                FetchError::Timeout {
                    timeout_ms: self.timeout.as_millis(),
                    source: e,
                }
            } else {
                error!(url = url, error = %e, "page_fetch_body_error");
                FetchError::Body(e)
            }
        })?;

        info!(
            url = url,
            status_code = status,
            body_length = body.len(),
            "page_fetch_complete"
        );

        Ok(body)
    }
}

/// Whether a `Content-Type` value denotes an HTML document.
fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    mime == "text/html" || mime == "application/xhtml+xml"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn fetcher(timeout: Duration) -> PageFetcher {
        PageFetcher::new(None, timeout, None).unwrap()
    }

    #[test]
    fn test_is_html_content_type() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("Application/XHTML+XML"));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type("application/pdf"));
    }

    #[tokio::test]
    async fn test_fetch_goes_through_proxy_with_credentials() {
        // An http:// target is sent to the proxy in absolute form.
        let mut proxy_server = mockito::Server::new_async().await;
        let mock = proxy_server
            .mock("GET", mockito::Matcher::Any)
            .match_header("proxy-authorization", "Basic dXNlcjpwYXNz")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><title>Proxied</title></html>")
            .create_async()
            .await;

        let proxy = ProxyConfig {
            host: proxy_server.host_with_port(),
            user: "user".to_string(),
            pass: "pass".to_string(),
        };
        let fetcher = PageFetcher::new(Some(&proxy), Duration::from_secs(5), None).unwrap();

        let body = fetcher
            .fetch("http://article.invalid/story")
            .await
            .unwrap();

        assert!(body.contains("Proxied"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_html() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/article")
            .match_header("accept", mockito::Matcher::Regex("^text/html".to_string()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><title>Hi</title><p>Body</p></html>")
            .create_async()
            .await;

        let body = fetcher(Duration::from_secs(5))
            .fetch(&format!("{}/article", server.url()))
            .await
            .unwrap();

        assert!(body.contains("<p>Body</p>"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_without_content_type_is_accepted() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/bare")
            .with_status(200)
            .with_body("<p>bare</p>")
            .create_async()
            .await;

        let body = fetcher(Duration::from_secs(5))
            .fetch(&format!("{}/bare", server.url()))
            .await
            .unwrap();

        assert_eq!(body, "<p>bare</p>");
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let err = fetcher(Duration::from_secs(5))
            .fetch(&format!("{}/data.json", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NotHtml(ref ct) if ct == "application/json"));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        // Accept connections but never answer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                if let Ok((socket, _)) = listener.accept().await {
                    held.push(socket);
                }
            }
        });

        let err = fetcher(Duration::from_millis(200))
            .fetch(&format!("http://{}/slow", addr))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout { timeout_ms: 200, .. }));
        assert!(err.to_string().starts_with("request timed out after 200ms"));
        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher(Duration::from_secs(5))
            .fetch(&format!("http://{}/gone", addr))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Request(_)));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let err = fetcher(Duration::from_secs(5))
            .fetch("http//not a url")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Request(_)));
    }
}
