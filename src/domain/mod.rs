pub mod collection;
pub mod conversation;
pub mod repositories;
pub mod task;
pub mod user;

pub use collection::Collection;
pub use conversation::{conversation_id, Conversation, ConversationRepository, Message};
pub use repositories::{DomainResult, RepositoryProvider};
pub use task::{
    Attachment, CreateTaskDto, Submission, Task, TaskMutation, TaskRepository, TaskStatus,
    UpdateTaskDto,
};
pub use user::{
    default_avatar_url, PublicUser, RegisterUserDto, UpdateUserDto, User, UserRepository, UserRole,
};

pub use crate::shared::errors::DomainError;
