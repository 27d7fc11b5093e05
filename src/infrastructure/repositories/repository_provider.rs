use std::sync::Arc;

use super::{LocalConversationRepository, LocalTaskRepository, LocalUserRepository};
use crate::domain::{ConversationRepository, RepositoryProvider, TaskRepository, UserRepository};
use crate::infrastructure::storage::PersistentStore;

/// Repositories backed by one shared [`PersistentStore`].
pub struct LocalRepositoryProvider {
    users: LocalUserRepository,
    tasks: LocalTaskRepository,
    conversations: LocalConversationRepository,
}

impl LocalRepositoryProvider {
    pub fn new(store: Arc<PersistentStore>) -> Self {
        Self {
            users: LocalUserRepository::new(store.clone()),
            tasks: LocalTaskRepository::new(store.clone()),
            conversations: LocalConversationRepository::new(store),
        }
    }
}

impl RepositoryProvider for LocalRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn tasks(&self) -> &dyn TaskRepository {
        &self.tasks
    }

    fn conversations(&self) -> &dyn ConversationRepository {
        &self.conversations
    }
}
