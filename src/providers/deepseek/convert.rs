use crate::core::types::{CompletionRequest, RequestMessage};

use super::types::{ChatCompletionRequest, ChatMessage};

pub fn to_api_request(model: &str, request: &CompletionRequest) -> ChatCompletionRequest {
    let stop = if request.stop_sequences.is_empty() {
        None
    } else {
        Some(request.stop_sequences.clone())
    };

    ChatCompletionRequest {
        model: model.to_string(),
        messages: request.messages.iter().map(to_chat_message).collect(),
        stream: true,
        temperature: Some(request.temperature),
        stop,
    }
}

fn to_chat_message(message: &RequestMessage) -> ChatMessage {
    ChatMessage {
        role: message.role.as_str().to_string(),
        content: message.content.clone(),
        prefix: message.prefix.then_some(true),
    }
}
