use futures::StreamExt;

use crate::core::conversation::{Conversation, MessageHandle};
use crate::core::error::{ChatError, Result};
use crate::providers::http::DeltaStream;

/// Lifecycle of one request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingResponse,
    Streaming,
    Complete,
    Failed { rolled_back: bool },
}

impl TurnState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed { .. })
    }
}

/// Snapshot emitted after each delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnUpdate {
    pub delta: String,
    pub content: String,
}

/// An accepted turn whose reply is streaming into the conversation.
///
/// Dropping a turn before it completes finalizes the assistant message with
/// whatever content has arrived and closes the response body.
pub struct Turn<'c> {
    conversation: &'c mut Conversation,
    handle: MessageHandle,
    deltas: DeltaStream,
    state: TurnState,
    received: usize,
}

impl<'c> Turn<'c> {
    pub(super) fn new(
        conversation: &'c mut Conversation,
        handle: MessageHandle,
        deltas: DeltaStream,
    ) -> Self {
        Self {
            conversation,
            handle,
            deltas,
            state: TurnState::Streaming,
            received: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Content accumulated so far.
    #[must_use]
    pub fn content(&self) -> &str {
        self.conversation.content_of(&self.handle).unwrap_or_default()
    }

    /// Waits for the next delta. `None` once the turn has completed or
    /// failed; a mid-stream failure is returned once as `StreamInterrupted`.
    pub async fn next_update(&mut self) -> Option<Result<TurnUpdate>> {
        if self.state.is_terminal() {
            return None;
        }

        match self.deltas.next().await {
            Some(Ok(delta)) => {
                let Some(content) = self.conversation.append_to(&self.handle, &delta) else {
                    let err = ChatError::InvalidState(
                        "in-flight message vanished from the conversation".to_string(),
                    );
                    self.state = TurnState::Failed { rolled_back: false };
                    return Some(Err(err));
                };
                let content = content.to_string();
                self.received += 1;
                Some(Ok(TurnUpdate { delta, content }))
            }
            Some(Err(e)) => {
                let partial_len = self.content().len();
                self.conversation.finalize(&self.handle);
                let err = ChatError::interrupted(&e, partial_len);
                self.conversation.set_error(err.to_string());
                self.state = TurnState::Failed { rolled_back: false };
                tracing::warn!(error = %e, partial_len, "Stream interrupted; keeping partial reply");
                Some(Err(err))
            }
            None => {
                self.conversation.finalize(&self.handle);
                self.state = TurnState::Complete;
                tracing::info!(
                    deltas = self.received,
                    bytes = self.content().len(),
                    "Turn complete"
                );
                None
            }
        }
    }

    /// Drives the turn to its end and returns the final content.
    pub async fn finish(mut self) -> Result<String> {
        while let Some(update) = self.next_update().await {
            update?;
        }
        match self.state {
            TurnState::Complete => Ok(self.content().to_string()),
            state => Err(ChatError::InvalidState(format!(
                "turn ended in state {state:?}"
            ))),
        }
    }
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        if self.state == TurnState::Streaming && self.conversation.finalize(&self.handle) {
            tracing::debug!(
                bytes = self.content().len(),
                "Turn cancelled; partial reply kept"
            );
        }
    }
}

impl std::fmt::Debug for Turn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Turn")
            .field("handle", &self.handle)
            .field("state", &self.state)
            .field("received", &self.received)
            .finish_non_exhaustive()
    }
}
