mod middleware;
pub mod sse;
pub mod utf8;

pub use sse::{DeltaStream, SseParser};

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::time::Duration;

use crate::providers::error::ProviderError;
use crate::providers::types::ApiKey;
use middleware::RequestLogger;

/// Transport settings. There is no overall request timeout by default: a
/// streamed answer can take minutes, and callers cancel by dropping the turn.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: None,
            user_agent: Some(format!("svgchat/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    inner: ClientWithMiddleware,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder().connect_timeout(config.connect_timeout);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        }

        let client = builder.build().map_err(|e| {
            ProviderError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        let inner = ClientBuilder::new(client).with(RequestLogger).build();

        Ok(Self { inner, config })
    }

    #[must_use]
    pub fn post(&self, url: &str, api_key: &ApiKey) -> reqwest_middleware::RequestBuilder {
        self.inner
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key.as_str()))
    }

    #[must_use]
    pub const fn config(&self) -> &HttpConfig {
        &self.config
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert!(config.timeout.is_none());
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert!(config.user_agent.as_deref().is_some_and(|ua| ua.starts_with("svgchat/")));
    }

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new().expect("client");
        assert!(client.config().timeout.is_none());
        let debug = format!("{client:?}");
        assert!(debug.contains("HttpClient"));
    }
}
