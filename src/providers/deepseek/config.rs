use crate::providers::types::{BaseUrl, ModelId};

/// Beta endpoint; prefix continuation is only served there.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/beta";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const API_KEY_ENV_VAR: &str = "DEEPSEEK_API_KEY";

#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub base_url: BaseUrl,
    pub default_model: ModelId,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
            default_model: ModelId::new(DEFAULT_MODEL),
        }
    }
}

impl DeepSeekConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<ModelId>) -> Self {
        self.default_model = model.into();
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        self.base_url.join("/chat/completions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let config = DeepSeekConfig::default();
        assert_eq!(
            config.endpoint(),
            "https://api.deepseek.com/beta/chat/completions"
        );
        assert_eq!(config.default_model.as_str(), "deepseek-chat");
    }

    #[test]
    fn test_custom_base_url() {
        let config = DeepSeekConfig::default()
            .with_base_url("http://localhost:8080/")
            .with_default_model("deepseek-reasoner");
        assert_eq!(config.endpoint(), "http://localhost:8080/chat/completions");
        assert_eq!(config.default_model.as_str(), "deepseek-reasoner");
    }
}
