pub mod chat;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod types;

pub use chat::{ChatConfig, ChatSession, OutputFormat, Turn, TurnState, TurnUpdate};
pub use conversation::{Conversation, ConversationSnapshot, MessageHandle};
pub use error::{ChatError, Result};
pub use llm::LLM;
