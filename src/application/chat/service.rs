//! Chat service
//!
//! Sends messages, marks threads read and answers unread-count queries.
//! Unread counts are always computed from the stored conversations, never
//! cached.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::queries::{sort_summaries, ConversationSummary};
use crate::domain::{
    conversation_id, Collection, Conversation, DomainError, DomainResult, Message, PublicUser,
    RepositoryProvider,
};
use crate::notifications::{ChangeEvent, ChangeKind, SharedChangeNotifier};
use crate::shared::time::display_time;
use crate::shared::{Operation, SharedClock, SimulatedLatency};

pub struct ChatService {
    repos: Arc<dyn RepositoryProvider>,
    notifier: SharedChangeNotifier,
    latency: SimulatedLatency,
    clock: SharedClock,
}

impl ChatService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        notifier: SharedChangeNotifier,
        latency: SimulatedLatency,
        clock: SharedClock,
    ) -> Self {
        Self {
            repos,
            notifier,
            latency,
            clock,
        }
    }

    pub fn notifier(&self) -> &SharedChangeNotifier {
        &self.notifier
    }

    /// Append an unread message to the pair's thread, creating the thread
    /// on first contact.
    pub async fn send_message(
        &self,
        sender_id: &str,
        recipient_id: &str,
        text: &str,
    ) -> DomainResult<Conversation> {
        if text.trim().is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        if sender_id == recipient_id {
            return Err(DomainError::Validation(
                "cannot send a message to yourself".into(),
            ));
        }

        self.latency.wait(Operation::SendMessage).await;

        let now = self.clock.now();
        let message = Message {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            sender_id: sender_id.to_string(),
            time: display_time(now),
            sent_at: now,
            read: false,
        };
        let conversation = self
            .repos
            .conversations()
            .append_message(sender_id, recipient_id, message)
            .await?;

        metrics::counter!("taskdesk_messages_sent_total").increment(1);
        debug!(conversation_id = %conversation.id, sender_id, "Message sent");
        self.publish(ChangeKind::MessageSent, &conversation.id);
        Ok(conversation)
    }

    /// Mark every message the reader did not send as read. Returns how many
    /// flipped; nothing is written or published when none did.
    pub async fn mark_conversation_read(
        &self,
        conversation_id: &str,
        reader_id: &str,
    ) -> DomainResult<usize> {
        let changed = self
            .repos
            .conversations()
            .mark_read(conversation_id, reader_id)
            .await?;

        if changed > 0 {
            info!(conversation_id, reader_id, changed, "Messages marked read");
            self.publish(ChangeKind::MessagesRead, conversation_id);
        }
        Ok(changed)
    }

    /// What opening a chat window does: mark the thread read for `reader_id`
    /// and return it. A pair that never talked gets an empty, unsaved thread.
    pub async fn open_conversation(&self, reader_id: &str, peer_id: &str) -> DomainResult<Conversation> {
        let id = conversation_id(reader_id, peer_id);
        self.mark_conversation_read(&id, reader_id).await?;

        Ok(self
            .repos
            .conversations()
            .find_by_id(&id)
            .await?
            .unwrap_or_else(|| Conversation::new(reader_id, peer_id)))
    }

    pub async fn unread_count(&self, user_id: &str) -> DomainResult<usize> {
        let conversations = self.repos.conversations().list_conversations().await?;
        Ok(conversations
            .iter()
            .filter(|c| c.has_participant(user_id))
            .map(|c| c.unread_for(user_id))
            .sum())
    }

    pub async fn conversations_for(&self, user_id: &str) -> DomainResult<Vec<Conversation>> {
        let conversations = self.repos.conversations().list_conversations().await?;
        Ok(conversations
            .into_iter()
            .filter(|c| c.has_participant(user_id))
            .collect())
    }

    pub async fn conversation_between(&self, a: &str, b: &str) -> DomainResult<Option<Conversation>> {
        self.repos
            .conversations()
            .find_by_id(&conversation_id(a, b))
            .await
    }

    /// Conversation list rows for `user_id`, one per peer (the user itself
    /// is skipped), most recent thread first.
    pub async fn summaries(
        &self,
        user_id: &str,
        peers: &[PublicUser],
    ) -> DomainResult<Vec<ConversationSummary>> {
        let conversations = self.conversations_for(user_id).await?;

        let mut rows: Vec<ConversationSummary> = peers
            .iter()
            .filter(|p| p.id != user_id)
            .map(|peer| {
                let id = conversation_id(user_id, &peer.id);
                let conversation = conversations.iter().find(|c| c.id == id);
                ConversationSummary::build(user_id, peer, conversation)
            })
            .collect();
        sort_summaries(&mut rows);
        Ok(rows)
    }

    fn publish(&self, kind: ChangeKind, conversation_id: &str) {
        self.notifier
            .publish(ChangeEvent::local(Collection::Conversations, kind, conversation_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infrastructure::{InMemoryBackend, LocalRepositoryProvider, PersistentStore};
    use crate::notifications::create_change_notifier;
    use crate::shared::SystemClock;
    use chrono::Utc;

    fn service() -> ChatService {
        let store = Arc::new(PersistentStore::new(Arc::new(InMemoryBackend::new())));
        ChatService::new(
            Arc::new(LocalRepositoryProvider::new(store)),
            create_change_notifier(),
            SimulatedLatency::disabled(),
            Arc::new(SystemClock),
        )
    }

    fn user(id: &str) -> PublicUser {
        PublicUser {
            id: id.into(),
            name: id.to_uppercase(),
            email: format!("{id}@x.com"),
            role: UserRole::Employee,
            avatar: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn unread_follows_the_recipient() {
        let chat = service();
        chat.send_message("user1", "user2", "hi").await.unwrap();

        assert_eq!(chat.unread_count("user2").await.unwrap(), 1);
        assert_eq!(chat.unread_count("user1").await.unwrap(), 0);

        let changed = chat
            .mark_conversation_read(&conversation_id("user1", "user2"), "user2")
            .await
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(chat.unread_count("user2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unread_sums_across_threads_and_ignores_own_messages() {
        let chat = service();
        chat.send_message("a", "me", "1").await.unwrap();
        chat.send_message("a", "me", "2").await.unwrap();
        chat.send_message("b", "me", "3").await.unwrap();
        chat.send_message("me", "b", "4").await.unwrap();
        chat.send_message("a", "b", "5").await.unwrap();

        assert_eq!(chat.unread_count("me").await.unwrap(), 3);

        chat.open_conversation("me", "a").await.unwrap();
        assert_eq!(chat.unread_count("me").await.unwrap(), 1);
        assert_eq!(chat.unread_count("b").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn blank_and_self_messages_are_rejected() {
        let chat = service();
        assert!(matches!(
            chat.send_message("a", "b", "   \n").await,
            Err(DomainError::EmptyMessage)
        ));
        assert!(matches!(
            chat.send_message("a", "a", "hello").await,
            Err(DomainError::Validation(_))
        ));
        assert!(chat.conversations_for("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn text_is_stored_as_typed() {
        let chat = service();
        let convo = chat.send_message("a", "b", "  see you \n").await.unwrap();
        assert_eq!(convo.messages[0].text, "  see you \n");
    }

    #[tokio::test]
    async fn message_ids_are_unique_under_rapid_sends() {
        let chat = service();
        for i in 0..20 {
            chat.send_message("a", "b", &format!("m{i}")).await.unwrap();
        }
        let convo = chat.conversation_between("b", "a").await.unwrap().unwrap();
        let mut ids: Vec<_> = convo.messages.iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn mark_read_publishes_only_on_change() {
        let chat = service();
        chat.send_message("a", "b", "hi").await.unwrap();
        let mut sub = chat.notifier().subscribe();
        let id = conversation_id("a", "b");

        assert_eq!(chat.mark_conversation_read(&id, "a").await.unwrap(), 0);
        assert!(sub.try_recv().is_none());

        assert_eq!(chat.mark_conversation_read(&id, "b").await.unwrap(), 1);
        let event = sub.try_recv().unwrap();
        assert_eq!(event.kind, ChangeKind::MessagesRead);
        assert_eq!(event.entity_id.as_deref(), Some(id.as_str()));

        assert_eq!(chat.mark_conversation_read(&id, "b").await.unwrap(), 0);
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn open_conversation_without_history() {
        let chat = service();
        let convo = chat.open_conversation("b", "a").await.unwrap();
        assert_eq!(convo.id, "a-b");
        assert!(convo.messages.is_empty());
        assert!(chat.conversation_between("a", "b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn summaries_skip_self_and_count_unread() {
        let chat = service();
        chat.send_message("b", "a", "hey a").await.unwrap();

        let peers = vec![user("a"), user("b"), user("c")];
        let rows = chat.summaries("a", &peers).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].peer_id, "b");
        assert_eq!(rows[0].unread, 1);
        assert_eq!(rows[0].last_message.as_deref(), Some("hey a"));
        assert_eq!(rows[1].peer_id, "c");
        assert_eq!(rows[1].last_message, None);
    }
}
