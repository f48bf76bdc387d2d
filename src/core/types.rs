use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub streaming: bool,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            streaming: false,
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Empty assistant message that deltas will be appended to.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            streaming: true,
            ..Self::new(Role::Assistant, String::new())
        }
    }

    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self.role, Role::User)
    }
}

/// Message as sent on the wire: role and content only, plus the
/// continuation marker for a seeded assistant prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    pub role: Role,
    pub content: String,
    pub prefix: bool,
}

impl RequestMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            prefix: false,
        }
    }

    #[must_use]
    pub fn prefix(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            prefix: true,
        }
    }
}

impl From<&Message> for RequestMessage {
    fn from(message: &Message) -> Self {
        Self::new(message.role, message.content.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<RequestMessage>,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
}

impl CompletionRequest {
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    #[must_use]
    pub const fn new(messages: Vec<RequestMessage>) -> Self {
        Self {
            messages,
            temperature: Self::DEFAULT_TEMPERATURE,
            stop_sequences: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_history(history: &[Message]) -> Self {
        Self::new(history.iter().map(RequestMessage::from).collect())
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.stop_sequences.push(stop.into());
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.messages.push(RequestMessage::prefix(prefix));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_streaming_and_empty() {
        let message = Message::placeholder();
        assert_eq!(message.role, Role::Assistant);
        assert!(message.streaming);
        assert!(message.content.is_empty());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&Role::Assistant).expect("serialize"),
            "\"assistant\""
        );
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_request_from_history_strips_metadata() {
        let mut streaming = Message::assistant("partial");
        streaming.streaming = true;
        let history = vec![Message::user("hi"), streaming];

        let request = CompletionRequest::from_history(&history).with_prefix("<svg>");

        assert_eq!(
            request.messages,
            vec![
                RequestMessage::new(Role::User, "hi"),
                RequestMessage::new(Role::Assistant, "partial"),
                RequestMessage::prefix("<svg>"),
            ]
        );
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
    }
}
