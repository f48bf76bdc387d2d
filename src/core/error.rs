use thiserror::Error;

use crate::config::persistence::StoreError;
use crate::providers::error::ProviderError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Please set API Key first")]
    MissingCredential,

    #[error("{message}")]
    RemoteRequestFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Stream interrupted after {partial_len} bytes: {message}")]
    StreamInterrupted { message: String, partial_len: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    /// Request-phase failure: nothing was streamed.
    #[must_use]
    pub fn rejected(err: &ProviderError) -> Self {
        Self::RemoteRequestFailed {
            status: err.status(),
            message: err.to_string(),
        }
    }

    #[must_use]
    pub fn interrupted(err: &ProviderError, partial_len: usize) -> Self {
        Self::StreamInterrupted {
            message: err.to_string(),
            partial_len,
        }
    }

    /// Whether the failed turn left no trace of the assistant reply.
    #[must_use]
    pub const fn rolled_back(&self) -> bool {
        matches!(self, Self::RemoteRequestFailed { .. })
    }
}

impl From<ProviderError> for ChatError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Configuration(message) => Self::Config(message),
            other => Self::rejected(&other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ChatError::MissingCredential.to_string(),
            "Please set API Key first"
        );

        let err = ChatError::rejected(&ProviderError::from_status(
            401,
            r#"{"error":{"message":"bad key"}}"#,
        ));
        assert_eq!(err.to_string(), "bad key");
        assert!(err.rolled_back());
        assert!(matches!(
            err,
            ChatError::RemoteRequestFailed {
                status: Some(401),
                ..
            }
        ));
    }

    #[test]
    fn test_interrupted_keeps_length() {
        let err = ChatError::interrupted(&ProviderError::StreamError("reset".into()), 12);
        assert_eq!(
            err.to_string(),
            "Stream interrupted after 12 bytes: Stream error: reset"
        );
        assert!(!err.rolled_back());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ChatError = io_err.into();
        assert!(matches!(err, ChatError::Io(_)));
    }

    #[test]
    fn test_error_from_provider_configuration() {
        let err: ChatError = ProviderError::Configuration("no client".into()).into();
        assert!(matches!(err, ChatError::Config(_)));

        let err = ChatError::rejected(&ProviderError::Configuration("no client".into()));
        assert!(err.rolled_back());
        assert_eq!(err.to_string(), "Configuration error: no client");
    }
}
