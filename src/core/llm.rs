use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use super::types::CompletionRequest;
use crate::providers::error::ProviderError;
use crate::providers::types::ApiKey;

/// Raw response body of an accepted request.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ProviderError>> + Send>>;

/// Transport seam. `stream` resolves once response headers arrive: an error
/// here means the request was rejected before any content was produced.
#[async_trait]
pub trait LLM: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    async fn stream(
        &self,
        api_key: &ApiKey,
        request: CompletionRequest,
    ) -> Result<ByteStream, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Message, RequestMessage};
    use futures::StreamExt;

    struct TestLLM;

    #[async_trait]
    impl LLM for TestLLM {
        fn name(&self) -> &'static str {
            "test"
        }

        fn model(&self) -> &'static str {
            "test-model"
        }

        async fn stream(
            &self,
            _api_key: &ApiKey,
            request: CompletionRequest,
        ) -> Result<ByteStream, ProviderError> {
            let echoed = Bytes::from(request.messages.len().to_string());
            Ok(Box::pin(futures::stream::iter(vec![Ok(echoed)])))
        }
    }

    #[tokio::test]
    async fn test_llm_trait_object_safe() {
        let llm: Box<dyn LLM> = Box::new(TestLLM);
        assert_eq!(llm.name(), "test");
        assert_eq!(llm.model(), "test-model");

        let request = CompletionRequest::new(vec![RequestMessage::from(&Message::user("hello"))]);
        let mut body = llm
            .stream(&ApiKey::new("key"), request)
            .await
            .expect("stream");
        let first = body.next().await.expect("chunk").expect("bytes");
        assert_eq!(&first[..], b"1");
    }
}
