//! Task aggregate: tasks, submissions and the status state machine.

pub mod model;
pub mod repository;
pub mod status;

mod dto_create;
mod dto_update;

pub use model::{Attachment, Submission, Task, TaskStatus};

pub use dto_create::CreateTaskDto;
pub use dto_update::UpdateTaskDto;

pub use repository::{TaskMutation, TaskRepository};
