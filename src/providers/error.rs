use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{message}")]
    Authentication { message: String, status: u16 },

    #[error("{message}")]
    RateLimit { message: String },

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{message}")]
    InvalidRequest { status: u16, message: String },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// HTTP status of a rejected request, if the error came from one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. }
            | Self::Server { status, .. }
            | Self::InvalidRequest { status, .. } => Some(*status),
            Self::RateLimit { .. } => Some(429),
            _ => None,
        }
    }

    /// Builds the error for a non-success response. The message is the
    /// body's `error.message` when present, otherwise a generic status line.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error")?.get("message")?.as_str().map(String::from))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {status}"));

        match status {
            401 | 403 => Self::Authentication { message, status },
            429 => Self::RateLimit { message },
            500..=599 => Self::Server { status, message },
            _ => Self::InvalidRequest { status, message },
        }
    }
}
