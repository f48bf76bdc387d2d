use tokio::sync::watch;
use uuid::Uuid;

use super::types::Message;

/// Write handle to the in-flight assistant message of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    id: Uuid,
    index: usize,
}

impl MessageHandle {
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }
}

/// What observers see after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub error: Option<String>,
}

impl ConversationSnapshot {
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.messages.last().is_some_and(|m| m.streaming)
    }
}

/// Ordered chat history with one mutable trailing slot while a reply streams.
///
/// Only one turn may be in flight: [`crate::core::chat::Turn`] borrows the
/// conversation mutably for its whole lifetime.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    error: Option<String>,
    updates: watch::Sender<ConversationSnapshot>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        let (updates, _) = watch::channel(ConversationSnapshot::default());
        Self {
            messages: Vec::new(),
            error: None,
            updates,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.messages.last().is_some_and(|m| m.streaming)
    }

    #[must_use]
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            error: self.error.clone(),
        }
    }

    /// Subscribes to snapshots. The receiver starts at the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.updates.send_replace(self.snapshot());
        self.updates.subscribe()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
        self.publish();
    }

    /// Appends a finished message, e.g. when restoring a saved history.
    pub fn push(&mut self, mut message: Message) {
        message.streaming = false;
        self.messages.push(message);
        self.publish();
    }

    pub fn begin_assistant(&mut self) -> MessageHandle {
        let message = Message::placeholder();
        let handle = MessageHandle {
            id: message.id,
            index: self.messages.len(),
        };
        self.messages.push(message);
        self.publish();
        handle
    }

    /// The single write path for streamed content. Returns the accumulated
    /// content, or `None` if the handle no longer points at a streaming
    /// message.
    pub fn append_to(&mut self, handle: &MessageHandle, delta: &str) -> Option<&str> {
        let message = self.streaming_slot(handle)?;
        message.content.push_str(delta);
        self.publish();
        self.messages.get(handle.index).map(|m| m.content.as_str())
    }

    /// Marks the message as no longer streaming, keeping its content.
    pub fn finalize(&mut self, handle: &MessageHandle) -> bool {
        let Some(message) = self.streaming_slot(handle) else {
            return false;
        };
        message.streaming = false;
        self.publish();
        true
    }

    /// Removes the message if it is still the trailing entry.
    pub fn rollback(&mut self, handle: &MessageHandle) -> Option<Message> {
        let is_trailing = handle.index + 1 == self.messages.len()
            && self.messages.get(handle.index).is_some_and(|m| m.id == handle.id);
        if !is_trailing {
            return None;
        }
        let removed = self.messages.pop();
        self.publish();
        removed
    }

    #[must_use]
    pub fn content_of(&self, handle: &MessageHandle) -> Option<&str> {
        self.messages
            .get(handle.index)
            .filter(|m| m.id == handle.id)
            .map(|m| m.content.as_str())
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.publish();
    }

    pub fn clear_error(&mut self) {
        if self.error.take().is_some() {
            self.publish();
        }
    }

    /// Clears messages and error together; observers get a single update.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.error = None;
        self.publish();
    }

    fn streaming_slot(&mut self, handle: &MessageHandle) -> Option<&mut Message> {
        self.messages
            .get_mut(handle.index)
            .filter(|m| m.id == handle.id && m.streaming)
    }

    fn publish(&self) {
        if self.updates.receiver_count() > 0 {
            self.updates.send_replace(self.snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Role;

    #[test]
    fn test_streaming_slot_lifecycle() {
        let mut conversation = Conversation::new();
        conversation.push_user("draw");
        let handle = conversation.begin_assistant();

        assert!(conversation.is_streaming());
        assert_eq!(conversation.append_to(&handle, "<svg"), Some("<svg"));
        assert_eq!(conversation.append_to(&handle, ">"), Some("<svg>"));

        assert!(conversation.finalize(&handle));
        assert!(!conversation.is_streaming());
        assert_eq!(conversation.content_of(&handle), Some("<svg>"));
    }

    #[test]
    fn test_finalized_message_is_immutable() {
        let mut conversation = Conversation::new();
        let handle = conversation.begin_assistant();
        conversation.finalize(&handle);

        assert!(conversation.append_to(&handle, "late").is_none());
        assert!(!conversation.finalize(&handle));
        assert_eq!(conversation.content_of(&handle), Some(""));
    }

    #[test]
    fn test_rollback_only_trailing() {
        let mut conversation = Conversation::new();
        conversation.push_user("first");
        let handle = conversation.begin_assistant();

        let removed = conversation.rollback(&handle).expect("removed");
        assert_eq!(removed.role, Role::Assistant);
        assert_eq!(conversation.len(), 1);
        assert!(conversation.rollback(&handle).is_none());
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut conversation = Conversation::new();
        let handle = conversation.begin_assistant();
        conversation.reset();
        conversation.push_user("new");

        assert!(conversation.append_to(&handle, "x").is_none());
        assert!(conversation.rollback(&handle).is_none());
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_reset_clears_messages_and_error() {
        let mut conversation = Conversation::new();
        conversation.push_user("a");
        conversation.set_error("boom");
        let mut rx = conversation.subscribe();
        rx.mark_unchanged();

        conversation.reset();

        assert!(conversation.is_empty());
        assert!(conversation.error().is_none());
        assert!(rx.has_changed().expect("sender alive"));
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen, ConversationSnapshot::default());
    }

    #[test]
    fn test_subscribe_starts_at_current_state() {
        let mut conversation = Conversation::new();
        conversation.push_user("before subscribe");

        let rx = conversation.subscribe();
        assert_eq!(rx.borrow().messages.len(), 1);
    }

    #[test]
    fn test_observers_see_each_delta() {
        let mut conversation = Conversation::new();
        let mut rx = conversation.subscribe();
        let handle = conversation.begin_assistant();
        assert!(rx.borrow_and_update().is_streaming());

        conversation.append_to(&handle, "abc");
        assert_eq!(rx.borrow_and_update().messages[0].content, "abc");

        conversation.finalize(&handle);
        assert!(!rx.borrow_and_update().is_streaming());
    }

    #[test]
    fn test_push_finished_message() {
        let mut conversation = Conversation::new();
        let mut message = Message::assistant("<svg/>");
        message.streaming = true;
        conversation.push(message);
        assert!(!conversation.is_streaming());
    }
}
