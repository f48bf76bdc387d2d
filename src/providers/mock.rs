use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::core::llm::{ByteStream, LLM};
use crate::core::types::CompletionRequest;
use crate::providers::error::ProviderError;
use crate::providers::types::ApiKey;

/// One scripted reply of [`MockLLM`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Accepted request; the body is delivered chunk by chunk. `stall` keeps
    /// the body open forever after the last chunk.
    Stream {
        chunks: Vec<Result<Bytes, String>>,
        stall: bool,
    },
    /// Rejected request with an HTTP status and error body.
    Rejected { status: u16, body: String },
    /// No response at all.
    Unreachable(String),
}

impl MockResponse {
    /// Well-formed SSE body carrying `deltas`, terminated by `[DONE]`.
    #[must_use]
    pub fn deltas(deltas: &[&str]) -> Self {
        let mut chunks: Vec<Result<Bytes, String>> = deltas
            .iter()
            .map(|delta| Ok(Bytes::from(sse_frame(delta))))
            .collect();
        chunks.push(Ok(Bytes::from_static(b"data: [DONE]\n\n")));
        Self::Stream {
            chunks,
            stall: false,
        }
    }

    /// Raw body chunks, delivered exactly as given.
    #[must_use]
    pub fn raw<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Bytes>,
    {
        Self::Stream {
            chunks: chunks.into_iter().map(|c| Ok(c.into())).collect(),
            stall: false,
        }
    }

    #[must_use]
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    /// Appends a transport failure after the chunks scripted so far.
    #[must_use]
    pub fn then_error(mut self, message: impl Into<String>) -> Self {
        if let Self::Stream { chunks, .. } = &mut self {
            chunks.push(Err(message.into()));
        }
        self
    }

    #[must_use]
    pub fn then_stall(mut self) -> Self {
        if let Self::Stream { stall, .. } = &mut self {
            *stall = true;
        }
        self
    }

    /// Drops the trailing `[DONE]` frame, if any.
    #[must_use]
    pub fn without_done(mut self) -> Self {
        if let Self::Stream { chunks, .. } = &mut self {
            if chunks
                .last()
                .is_some_and(|c| c.as_ref().is_ok_and(|b| b.starts_with(b"data: [DONE]")))
            {
                chunks.pop();
            }
        }
        self
    }

    fn into_result(self) -> Result<ByteStream, ProviderError> {
        match self {
            Self::Stream { chunks, stall } => {
                let body = futures::stream::iter(
                    chunks
                        .into_iter()
                        .map(|c| c.map_err(ProviderError::StreamError)),
                );
                if stall {
                    Ok(Box::pin(body.chain(futures::stream::pending())))
                } else {
                    Ok(Box::pin(body))
                }
            }
            Self::Rejected { status, body } => Err(ProviderError::from_status(status, &body)),
            Self::Unreachable(message) => Err(ProviderError::Connection(message)),
        }
    }
}

/// Encodes one content delta as a chat-completion SSE line.
#[must_use]
pub fn sse_frame(delta: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({ "choices": [{ "index": 0, "delta": { "content": delta } }] })
    )
}

#[derive(Clone, Default)]
pub struct MockLLM {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    request_history: Arc<Mutex<Vec<CompletionRequest>>>,
    keys_seen: Arc<Mutex<Vec<ApiKey>>>,
}

impl MockLLM {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(self, response: MockResponse) -> Self {
        self.responses.lock().push(response);
        self
    }

    #[must_use]
    pub fn request_history(&self) -> Vec<CompletionRequest> {
        self.request_history.lock().clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_history.lock().len()
    }

    #[must_use]
    pub fn keys_seen(&self) -> Vec<ApiKey> {
        self.keys_seen.lock().clone()
    }

    fn next_response(&self) -> MockResponse {
        let mut responses = self.responses.lock();
        if responses.is_empty() {
            MockResponse::Unreachable("MockLLM: No responses queued".to_string())
        } else {
            responses.remove(0)
        }
    }
}

impl std::fmt::Debug for MockLLM {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLLM")
            .field("queued", &self.responses.lock().len())
            .field("requests", &self.request_count())
            .finish()
    }
}

#[async_trait]
impl LLM for MockLLM {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &'static str {
        "mock-model"
    }

    async fn stream(
        &self,
        api_key: &ApiKey,
        request: CompletionRequest,
    ) -> Result<ByteStream, ProviderError> {
        self.request_history.lock().push(request);
        self.keys_seen.lock().push(api_key.clone());
        self.next_response().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Message, RequestMessage};

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![RequestMessage::from(&Message::user("hi"))])
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockLLM::new().with_response(MockResponse::deltas(&["a"]));
        let key = ApiKey::new("k");

        let body = mock.stream(&key, request()).await.expect("stream");
        let chunks: Vec<_> = body.collect().await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(mock.request_count(), 1);
        assert_eq!(mock.keys_seen(), vec![key]);
    }

    #[tokio::test]
    async fn test_mock_rejected() {
        let mock = MockLLM::new().with_response(MockResponse::rejected(
            401,
            r#"{"error":{"message":"bad key"}}"#,
        ));

        let err = mock
            .stream(&ApiKey::new("k"), request())
            .await
            .err()
            .expect("rejection");
        assert_eq!(err.to_string(), "bad key");
    }

    #[tokio::test]
    async fn test_mock_without_queue_is_unreachable() {
        let mock = MockLLM::new();
        let result = mock.stream(&ApiKey::new("k"), request()).await;
        assert!(matches!(result, Err(ProviderError::Connection(_))));
    }

    #[test]
    fn test_without_done_strips_sentinel() {
        match MockResponse::deltas(&["x"]).without_done() {
            MockResponse::Stream { chunks, .. } => assert_eq!(chunks.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}
