//! Repository implementations on top of the persistent store.

mod conversation_repository;
mod repository_provider;
mod task_repository;
mod user_repository;

pub use conversation_repository::LocalConversationRepository;
pub use repository_provider::LocalRepositoryProvider;
pub use task_repository::LocalTaskRepository;
pub use user_repository::LocalUserRepository;
