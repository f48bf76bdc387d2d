use tokio::sync::mpsc;
use tracing::warn;

use super::credentials::Credentials;
use super::persistence::StoreError;
use super::theme::{Theme, ThemePreference};
use crate::providers::types::ApiKey;

#[derive(Debug, Clone)]
pub enum StoreEvent {
    ThemeChanged(Theme),
    /// `None` clears the stored key.
    CredentialChanged(Option<ApiKey>),
}

pub type StoreEventSender = mpsc::UnboundedSender<StoreEvent>;
pub type StoreEventReceiver = mpsc::UnboundedReceiver<StoreEvent>;

/// Persists preference changes off the input path. Failures are logged; the
/// in-memory change has already taken effect.
pub struct StoreEventHandler {
    credentials: Credentials,
    theme: ThemePreference,
    event_rx: StoreEventReceiver,
}

impl StoreEventHandler {
    #[must_use]
    pub fn new(credentials: Credentials, theme: ThemePreference) -> (Self, StoreEventSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                credentials,
                theme,
                event_rx: rx,
            },
            tx,
        )
    }

    pub async fn run(mut self) {
        while let Some(event) = self.event_rx.recv().await {
            if let Err(e) = self.handle_event(&event) {
                warn!(
                    "Failed to persist preference change: {}. Change succeeded in-memory.",
                    e
                );
            }
        }
    }

    fn handle_event(&self, event: &StoreEvent) -> Result<(), StoreError> {
        match event {
            StoreEvent::ThemeChanged(theme) => {
                self.theme.save(*theme)?;
                tracing::debug!("Persisted theme change: {}", theme);
            }
            StoreEvent::CredentialChanged(Some(key)) => {
                self.credentials.save(key)?;
                tracing::debug!("Persisted API key {}", key.redacted());
            }
            StoreEvent::CredentialChanged(None) => {
                self.credentials.clear()?;
                tracing::debug!("Cleared stored API key");
            }
        }
        Ok(())
    }
}
