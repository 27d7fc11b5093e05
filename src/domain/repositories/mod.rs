//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-collection repositories
//! - `DomainResult`: standard result type for domain operations

use super::conversation::ConversationRepository;
use super::task::TaskRepository;
use super::user::UserRepository;

pub use crate::shared::errors::DomainResult;

/// Provides access to all domain repositories.
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn tasks(&self) -> &dyn TaskRepository;
    fn conversations(&self) -> &dyn ConversationRepository;
}
