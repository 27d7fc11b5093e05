use async_trait::async_trait;

use super::User;
use crate::domain::DomainResult;

/// Table-level access to the users collection.
///
/// Each mutating call is one read-modify-write of the whole collection.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> DomainResult<Vec<User>>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Fails with `DuplicateEmail` if the email is taken.
    async fn insert_user(&self, user: User) -> DomainResult<User>;

    /// Replace the stored record with the same id. `NotFound` if absent,
    /// `DuplicateEmail` if the new email belongs to someone else.
    async fn replace_user(&self, user: User) -> DomainResult<User>;

    /// Hard delete. `NotFound` if absent.
    async fn delete_user(&self, id: &str) -> DomainResult<()>;
}
