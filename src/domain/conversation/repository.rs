use async_trait::async_trait;

use super::{Conversation, Message};
use crate::domain::DomainResult;

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn list_conversations(&self) -> DomainResult<Vec<Conversation>>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Conversation>>;

    /// Append to the conversation between `sender_id` and `recipient_id`,
    /// creating it on first message.
    async fn append_message(
        &self,
        sender_id: &str,
        recipient_id: &str,
        message: Message,
    ) -> DomainResult<Conversation>;

    /// Mark incoming messages read for `reader_id`. Writes nothing and
    /// returns 0 when there was nothing unread (or no such conversation).
    async fn mark_read(&self, conversation_id: &str, reader_id: &str) -> DomainResult<usize>;
}
