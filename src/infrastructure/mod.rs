//! Infrastructure layer - storage backends, repository tables, credentials

pub mod crypto;
pub mod repositories;
pub mod storage;

pub use repositories::{
    LocalConversationRepository, LocalRepositoryProvider, LocalTaskRepository,
    LocalUserRepository,
};
pub use storage::{
    Commit, FileBackend, InMemoryBackend, PersistentStore, StorageBackend, StoreWatcher,
};
