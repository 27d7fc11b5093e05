//! Task service
//!
//! Creation, manager edits and assignee submissions. Status changes are
//! delegated to the task state machine in the domain layer; this service
//! only sequences latency, the table write and the change event.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::queries::{due_between, TaskStats};
use crate::application::identity::Session;
use crate::domain::{
    Attachment, Collection, CreateTaskDto, DomainError, DomainResult, RepositoryProvider, Task,
    TaskStatus, UpdateTaskDto,
};
use crate::notifications::{ChangeEvent, ChangeKind, SharedChangeNotifier};
use crate::shared::{Operation, SharedClock, SimulatedLatency};

pub struct TaskService {
    repos: Arc<dyn RepositoryProvider>,
    notifier: SharedChangeNotifier,
    latency: SimulatedLatency,
    clock: SharedClock,
}

impl TaskService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        notifier: SharedChangeNotifier,
        latency: SimulatedLatency,
        clock: SharedClock,
    ) -> Self {
        Self {
            repos,
            notifier,
            latency,
            clock,
        }
    }

    /// New tasks start as Pending with no submissions. Field presence is
    /// checked by the caller.
    pub async fn create_task(&self, dto: CreateTaskDto) -> DomainResult<Task> {
        self.latency.wait(Operation::CreateTask).await;

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: dto.title,
            description: dto.description,
            deadline: dto.deadline,
            assigned_to: dto.assigned_to,
            status: TaskStatus::Pending,
            submissions: Vec::new(),
            attachments: dto.attachments,
            created_at: self.clock.now(),
        };
        let task = self.repos.tasks().insert_task(task).await?;

        info!(task_id = %task.id, assigned_to = %task.assigned_to, deadline = %task.deadline, "Task created");
        self.publish(ChangeKind::Created, &task.id);
        Ok(task)
    }

    pub async fn update_task(&self, id: &str, updates: UpdateTaskDto) -> DomainResult<Task> {
        self.latency.wait(Operation::UpdateTask).await;

        let task = self
            .repos
            .tasks()
            .modify_task(id, Box::new(move |task: &mut Task| task.apply_update(updates)))
            .await?;

        info!(task_id = %task.id, status = %task.status, "Task updated");
        self.publish(ChangeKind::Updated, &task.id);
        Ok(task)
    }

    /// Record the assignee's hand-in. Lateness is decided now, once.
    pub async fn submit_task(&self, task_id: &str, attachment: Attachment) -> DomainResult<Task> {
        self.latency.wait(Operation::SubmitTask).await;

        let now = self.clock.now();
        let task = self
            .repos
            .tasks()
            .modify_task(
                task_id,
                Box::new(move |task: &mut Task| task.record_submission(attachment, now).map(|_| ())),
            )
            .await?;

        let late = task.status == TaskStatus::LateSubmission;
        metrics::counter!("taskdesk_task_submissions_total", "late" => late.to_string()).increment(1);
        info!(task_id = %task.id, status = %task.status, late, "Task submitted");
        self.publish(ChangeKind::Submitted, &task.id);
        Ok(task)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_tasks(&self) -> DomainResult<Vec<Task>> {
        self.repos.tasks().list_tasks().await
    }

    pub async fn get_task(&self, id: &str) -> DomainResult<Task> {
        self.repos
            .tasks()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Task", id))
    }

    /// Employees see their own tasks; managers and admins see all of them.
    pub async fn tasks_for(&self, viewer: &Session) -> DomainResult<Vec<Task>> {
        if viewer.role.can_manage_tasks() {
            self.list_tasks().await
        } else {
            self.tasks_assigned_to(&viewer.user_id).await
        }
    }

    pub async fn tasks_assigned_to(&self, user_id: &str) -> DomainResult<Vec<Task>> {
        let tasks = self.list_tasks().await?;
        Ok(tasks.into_iter().filter(|t| t.assigned_to == user_id).collect())
    }

    pub async fn tasks_due_between(&self, from: NaiveDate, to: NaiveDate) -> DomainResult<Vec<Task>> {
        Ok(due_between(self.list_tasks().await?, from, to))
    }

    pub fn stats(&self, tasks: &[Task]) -> TaskStats {
        TaskStats::from_tasks(tasks, self.clock.now())
    }

    fn publish(&self, kind: ChangeKind, task_id: &str) {
        self.notifier
            .publish(ChangeEvent::local(Collection::Tasks, kind, task_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infrastructure::{InMemoryBackend, LocalRepositoryProvider, PersistentStore};
    use crate::notifications::create_change_notifier;
    use crate::shared::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    fn service() -> (Arc<FixedClock>, TaskService) {
        let store = Arc::new(PersistentStore::new(Arc::new(InMemoryBackend::new())));
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 5, 10, 9, 30, 0).unwrap(),
        ));
        let svc = TaskService::new(
            Arc::new(LocalRepositoryProvider::new(store)),
            create_change_notifier(),
            SimulatedLatency::disabled(),
            clock.clone(),
        );
        (clock, svc)
    }

    fn new_task(assigned_to: &str, deadline: NaiveDate) -> CreateTaskDto {
        CreateTaskDto {
            title: "Quarterly report".into(),
            description: "Summarise Q1".into(),
            deadline,
            assigned_to: assigned_to.into(),
            attachments: Vec::new(),
        }
    }

    fn attachment() -> Attachment {
        Attachment {
            file_name: "report.pdf".into(),
            file_size: 2048,
            url: "blob:report".into(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn on_time_submission_completes_task() {
        let (_, svc) = service();
        let task = svc.create_task(new_task("e1", date(2026, 5, 11))).await.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.submissions.is_empty());

        let done = svc.submit_task(&task.id, attachment()).await.unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.submissions.len(), 1);
        assert!(!done.submissions[0].is_late);

        let again = svc.submit_task(&task.id, attachment()).await.unwrap_err();
        assert!(matches!(again, DomainError::AlreadySubmitted(_)));
        assert_eq!(svc.get_task(&task.id).await.unwrap().submissions.len(), 1);
    }

    #[tokio::test]
    async fn past_deadline_submission_is_late() {
        let (clock, svc) = service();
        let task = svc.create_task(new_task("e1", date(2026, 5, 11))).await.unwrap();

        clock.advance(Duration::days(1));
        let done = svc.submit_task(&task.id, attachment()).await.unwrap();
        assert_eq!(done.status, TaskStatus::LateSubmission);
        assert!(done.submissions[0].is_late);
    }

    #[tokio::test]
    async fn submit_unknown_task_is_not_found() {
        let (_, svc) = service();
        assert!(matches!(
            svc.submit_task("missing", attachment()).await,
            Err(DomainError::NotFound { entity: "Task", .. })
        ));
    }

    #[tokio::test]
    async fn update_merges_fields_and_guards_status() {
        let (_, svc) = service();
        let task = svc.create_task(new_task("e1", date(2026, 6, 1))).await.unwrap();

        let updated = svc
            .update_task(
                &task.id,
                UpdateTaskDto {
                    status: Some(TaskStatus::InProgress),
                    assigned_to: Some("e2".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.assigned_to, "e2");
        assert_eq!(updated.title, task.title);

        let err = svc
            .update_task(
                &task.id,
                UpdateTaskDto {
                    status: Some(TaskStatus::Completed),
                    title: Some("renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatusTransition { .. }));
        assert_eq!(svc.get_task(&task.id).await.unwrap().title, task.title);

        assert!(matches!(
            svc.update_task("missing", UpdateTaskDto::default()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn visibility_follows_role() {
        let (_, svc) = service();
        svc.create_task(new_task("e1", date(2026, 6, 1))).await.unwrap();
        svc.create_task(new_task("e2", date(2026, 6, 2))).await.unwrap();

        let employee = Session {
            user_id: "e1".into(),
            role: UserRole::Employee,
        };
        let manager = Session {
            user_id: "m1".into(),
            role: UserRole::Manager,
        };
        let mine = svc.tasks_for(&employee).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].assigned_to, "e1");
        assert_eq!(svc.tasks_for(&manager).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stats_use_the_service_clock() {
        let (clock, svc) = service();
        svc.create_task(new_task("e1", date(2026, 5, 11))).await.unwrap();

        let tasks = svc.list_tasks().await.unwrap();
        assert_eq!(svc.stats(&tasks).overdue, 0);

        clock.advance(Duration::days(2));
        let stats = svc.stats(&tasks);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.pending, 1);
    }

    #[tokio::test]
    async fn calendar_window() {
        let (_, svc) = service();
        svc.create_task(new_task("e1", date(2026, 5, 20))).await.unwrap();
        svc.create_task(new_task("e1", date(2026, 7, 1))).await.unwrap();

        let may = svc
            .tasks_due_between(date(2026, 5, 1), date(2026, 5, 31))
            .await
            .unwrap();
        assert_eq!(may.len(), 1);
        assert_eq!(may[0].deadline, date(2026, 5, 20));
    }
}
