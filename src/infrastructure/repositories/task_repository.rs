use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Collection, DomainError, DomainResult, Task, TaskMutation, TaskRepository};
use crate::infrastructure::storage::{Commit, PersistentStore};

const KEY: &str = Collection::Tasks.storage_key();

pub struct LocalTaskRepository {
    store: Arc<PersistentStore>,
}

impl LocalTaskRepository {
    pub fn new(store: Arc<PersistentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TaskRepository for LocalTaskRepository {
    async fn list_tasks(&self) -> DomainResult<Vec<Task>> {
        Ok(self.store.read(KEY))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Task>> {
        Ok(self
            .store
            .read::<Task>(KEY)
            .into_iter()
            .find(|t| t.id == id))
    }

    async fn insert_task(&self, task: Task) -> DomainResult<Task> {
        self.store
            .modify(KEY, move |tasks: &mut Vec<Task>| {
                tasks.push(task.clone());
                Ok::<_, DomainError>(Commit::Write(task))
            })
            .await
    }

    async fn modify_task(&self, id: &str, mutation: TaskMutation) -> DomainResult<Task> {
        self.store
            .modify(KEY, move |tasks: &mut Vec<Task>| {
                let task = tasks
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| DomainError::not_found("Task", id))?;
                mutation(task)?;
                Ok(Commit::Write(task.clone()))
            })
            .await
    }
}
