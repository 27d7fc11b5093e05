use async_trait::async_trait;

use super::Task;
use crate::domain::DomainResult;

/// In-place edit applied to one task inside the table write. Returning an
/// error aborts the write.
pub type TaskMutation = Box<dyn FnOnce(&mut Task) -> DomainResult<()> + Send>;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list_tasks(&self) -> DomainResult<Vec<Task>>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Task>>;
    async fn insert_task(&self, task: Task) -> DomainResult<Task>;

    /// Read-modify-write of a single task. `NotFound` if absent.
    async fn modify_task(&self, id: &str, mutation: TaskMutation) -> DomainResult<Task>;
}
