use std::sync::Arc;

use super::conversation::Conversation;
use super::error::{ChatError, Result};
use super::llm::LLM;
use super::types::{CompletionRequest, Message};
use crate::providers::http::SseParser;
use crate::providers::types::ApiKey;

mod format;
mod turn;

pub use format::OutputFormat;
pub use turn::{Turn, TurnState, TurnUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub format: OutputFormat,
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Svg,
            temperature: CompletionRequest::DEFAULT_TEMPERATURE,
        }
    }
}

/// Drives chat turns against one backend.
pub struct ChatSession {
    llm: Arc<dyn LLM>,
    credential: Option<ApiKey>,
    config: ChatConfig,
}

impl ChatSession {
    #[must_use]
    pub fn new(llm: Arc<dyn LLM>) -> Self {
        Self::with_config(llm, ChatConfig::default())
    }

    #[must_use]
    pub fn with_config(llm: Arc<dyn LLM>, config: ChatConfig) -> Self {
        Self {
            llm,
            credential: None,
            config,
        }
    }

    pub fn set_credential(&mut self, credential: Option<ApiKey>) {
        self.credential = credential.filter(|key| !key.is_empty());
    }

    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub const fn set_format(&mut self, format: OutputFormat) {
        self.config.format = format;
    }

    #[must_use]
    pub const fn config(&self) -> &ChatConfig {
        &self.config
    }

    #[must_use]
    pub fn llm(&self) -> &dyn LLM {
        self.llm.as_ref()
    }

    /// Starts a turn: records the user message and an empty assistant reply,
    /// then sends the request. Resolves once the response has been accepted.
    ///
    /// Without a credential nothing is recorded or sent. If the request is
    /// rejected the assistant placeholder is removed again and the error is
    /// stored on the conversation.
    pub async fn send_turn<'c>(
        &self,
        conversation: &'c mut Conversation,
        text: impl Into<String>,
    ) -> Result<Turn<'c>> {
        let Some(api_key) = self.credential.as_ref() else {
            return Err(ChatError::MissingCredential);
        };

        conversation.clear_error();
        conversation.push_user(text);
        let request = self.build_request(conversation.messages());
        let handle = conversation.begin_assistant();

        tracing::debug!(
            llm = self.llm.name(),
            model = self.llm.model(),
            history = request.messages.len(),
            format = ?self.config.format,
            "Awaiting response"
        );

        match self.llm.stream(api_key, request).await {
            Ok(body) => Ok(Turn::new(
                conversation,
                handle,
                SseParser::parse_stream(body),
            )),
            Err(e) => {
                conversation.rollback(&handle);
                let err = ChatError::rejected(&e);
                conversation.set_error(err.to_string());
                tracing::warn!(error = %err, "Request rejected; assistant placeholder removed");
                Err(err)
            }
        }
    }

    fn build_request(&self, history: &[Message]) -> CompletionRequest {
        let mut request =
            CompletionRequest::from_history(history).with_temperature(self.config.temperature);

        if let Some(prefix) = self.config.format.prefix() {
            request = request.with_prefix(prefix);
        }
        if let Some(stop) = self.config.format.stop_sequence() {
            request = request.with_stop_sequence(stop);
        }

        request
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("llm", &self.llm.name())
            .field("credential", &self.credential)
            .field("config", &self.config)
            .finish()
    }
}
