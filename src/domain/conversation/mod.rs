//! Conversation aggregate: per-pair message threads and unread tracking.

pub mod model;
pub mod repository;

pub use model::{conversation_id, Conversation, Message};
pub use repository::ConversationRepository;
