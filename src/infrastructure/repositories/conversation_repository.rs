use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    conversation_id, Collection, Conversation, ConversationRepository, DomainError, DomainResult,
    Message,
};
use crate::infrastructure::storage::{Commit, PersistentStore};

const KEY: &str = Collection::Conversations.storage_key();

pub struct LocalConversationRepository {
    store: Arc<PersistentStore>,
}

impl LocalConversationRepository {
    pub fn new(store: Arc<PersistentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConversationRepository for LocalConversationRepository {
    async fn list_conversations(&self) -> DomainResult<Vec<Conversation>> {
        Ok(self.store.read(KEY))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Conversation>> {
        Ok(self
            .store
            .read::<Conversation>(KEY)
            .into_iter()
            .find(|c| c.id == id))
    }

    async fn append_message(
        &self,
        sender_id: &str,
        recipient_id: &str,
        message: Message,
    ) -> DomainResult<Conversation> {
        let id = conversation_id(sender_id, recipient_id);
        self.store
            .modify(KEY, move |conversations: &mut Vec<Conversation>| {
                let index = match conversations.iter().position(|c| c.id == id) {
                    Some(index) => index,
                    None => {
                        conversations.push(Conversation::new(sender_id, recipient_id));
                        conversations.len() - 1
                    }
                };
                let conversation = &mut conversations[index];
                conversation.messages.push(message);
                Ok::<_, DomainError>(Commit::Write(conversation.clone()))
            })
            .await
    }

    async fn mark_read(&self, conversation_id: &str, reader_id: &str) -> DomainResult<usize> {
        self.store
            .modify(KEY, |conversations: &mut Vec<Conversation>| {
                let changed = conversations
                    .iter_mut()
                    .find(|c| c.id == conversation_id)
                    .map(|c| c.mark_read_by(reader_id))
                    .unwrap_or(0);
                if changed == 0 {
                    Ok::<_, DomainError>(Commit::Skip(0))
                } else {
                    Ok(Commit::Write(changed))
                }
            })
            .await
    }
}
