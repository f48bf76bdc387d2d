pub mod config;
pub mod convert;
pub mod types;

use async_trait::async_trait;
use futures::StreamExt;

use crate::core::llm::{ByteStream, LLM};
use crate::core::types::CompletionRequest;
use crate::providers::error::ProviderError;
use crate::providers::http::HttpClient;
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

pub use config::{API_KEY_ENV_VAR, DEFAULT_BASE_URL, DEFAULT_MODEL, DeepSeekConfig};

#[derive(Clone)]
pub struct DeepSeekProvider {
    http: HttpClient,
    config: DeepSeekConfig,
    model: ModelId,
}

impl std::fmt::Debug for DeepSeekProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekProvider")
            .field("model", &self.model)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl DeepSeekProvider {
    pub fn new(config: DeepSeekConfig) -> Result<Self, ProviderError> {
        let model = config.default_model.clone();
        Ok(Self {
            http: HttpClient::new()?,
            config,
            model,
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        self.config.endpoint()
    }
}

#[async_trait]
impl LLM for DeepSeekProvider {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }

    async fn stream(
        &self,
        api_key: &ApiKey,
        request: CompletionRequest,
    ) -> Result<ByteStream, ProviderError> {
        let api_request = convert::to_api_request(self.model.as_str(), &request);
        let body = serde_json::to_string(&api_request)
            .map_err(|e| ProviderError::Configuration(format!("Unserializable request: {e}")))?;

        tracing::debug!(
            model = %self.model,
            messages = api_request.messages.len(),
            "Sending streaming chat request"
        );

        let response = self
            .http
            .post(&self.endpoint(), api_key)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &error_body));
        }

        let byte_stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ProviderError::StreamError(e.to_string())));

        Ok(Box::pin(byte_stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = DeepSeekProvider::new(DeepSeekConfig::default()).expect("create provider");
        assert_eq!(provider.name(), "deepseek");
        assert_eq!(provider.model(), "deepseek-chat");
    }

    #[test]
    fn test_provider_with_model() {
        let provider = DeepSeekProvider::new(DeepSeekConfig::default())
            .expect("create provider")
            .with_model("deepseek-reasoner");
        assert_eq!(provider.model(), "deepseek-reasoner");
    }

    #[test]
    fn test_endpoint_generation() {
        let provider = DeepSeekProvider::new(DeepSeekConfig::default())
            .expect("create provider")
            .with_base_url("http://localhost:9000/");
        assert_eq!(provider.endpoint(), "http://localhost:9000/chat/completions");
    }

    #[test]
    fn test_provider_debug_omits_client() {
        let provider = DeepSeekProvider::new(DeepSeekConfig::default()).expect("create provider");
        let debug = format!("{provider:?}");
        assert!(debug.contains("DeepSeekProvider"));
        assert!(debug.contains("deepseek-chat"));
    }
}
