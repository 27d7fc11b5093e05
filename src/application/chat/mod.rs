//! Chat: one thread per pair of users, unread tracking and the live badge.

pub mod badge;
pub mod queries;
pub mod service;

pub use badge::UnreadBadge;
pub use queries::ConversationSummary;
pub use service::ChatService;
