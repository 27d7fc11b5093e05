use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Collection, DomainError, DomainResult, User, UserRepository};
use crate::infrastructure::storage::{Commit, PersistentStore};

const KEY: &str = Collection::Users.storage_key();

pub struct LocalUserRepository {
    store: Arc<PersistentStore>,
}

impl LocalUserRepository {
    pub fn new(store: Arc<PersistentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for LocalUserRepository {
    async fn list_users(&self) -> DomainResult<Vec<User>> {
        Ok(self.store.read(KEY))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self
            .store
            .read::<User>(KEY)
            .into_iter()
            .find(|u| u.id == id))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .store
            .read::<User>(KEY)
            .into_iter()
            .find(|u| u.email == email))
    }

    async fn insert_user(&self, user: User) -> DomainResult<User> {
        self.store
            .modify(KEY, move |users: &mut Vec<User>| {
                if users.iter().any(|u| u.email == user.email) {
                    return Err(DomainError::DuplicateEmail(user.email));
                }
                if users.iter().any(|u| u.id == user.id) {
                    return Err(DomainError::Validation(format!(
                        "user id already exists: {}",
                        user.id
                    )));
                }
                users.push(user.clone());
                Ok(Commit::Write(user))
            })
            .await
    }

    async fn replace_user(&self, user: User) -> DomainResult<User> {
        self.store
            .modify(KEY, move |users: &mut Vec<User>| {
                if users.iter().any(|u| u.email == user.email && u.id != user.id) {
                    return Err(DomainError::DuplicateEmail(user.email));
                }
                let slot = users
                    .iter_mut()
                    .find(|u| u.id == user.id)
                    .ok_or_else(|| DomainError::not_found("User", user.id.as_str()))?;
                *slot = user.clone();
                Ok(Commit::Write(user))
            })
            .await
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        self.store
            .modify(KEY, |users: &mut Vec<User>| {
                let before = users.len();
                users.retain(|u| u.id != id);
                if users.len() == before {
                    return Err(DomainError::not_found("User", id));
                }
                Ok(Commit::Write(()))
            })
            .await
    }
}
