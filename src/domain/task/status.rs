//! Task status state machine.
//!
//! ```text
//!   Pending <──update──> In Progress
//!      │                     │
//!      └──────submit─────────┤
//!                            ▼
//!            Completed | Late Submission   (terminal)
//! ```
//!
//! All status changes go through [`TaskStatus::transition_to`] (manual
//! updates) or [`Task::record_submission`] (assignee hand-in).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Attachment, Submission, Task, TaskStatus, UpdateTaskDto};
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::time::is_past_deadline;

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::LateSubmission)
    }

    /// Status reached by a submission made on time or late.
    pub fn after_submission(is_late: bool) -> Self {
        if is_late {
            Self::LateSubmission
        } else {
            Self::Completed
        }
    }

    /// Validate a manual status change requested through `update_task`.
    ///
    /// Only Pending <-> In Progress is allowed. Terminal states are reached
    /// through submissions alone and are never left.
    pub fn transition_to(self, task_id: &str, target: TaskStatus) -> DomainResult<TaskStatus> {
        if self == target {
            return Ok(target);
        }
        if self.is_terminal() || target.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                task_id: task_id.to_string(),
                from: self.to_string(),
                to: target.to_string(),
            });
        }
        Ok(target)
    }
}

impl Task {
    /// Shallow-merge `updates` into the task. Nothing is changed if the
    /// status change is rejected.
    pub fn apply_update(&mut self, updates: UpdateTaskDto) -> DomainResult<()> {
        let status = match updates.status {
            Some(target) => self.status.transition_to(&self.id, target)?,
            None => self.status,
        };

        if let Some(title) = updates.title {
            self.title = title;
        }
        if let Some(description) = updates.description {
            self.description = description;
        }
        if let Some(deadline) = updates.deadline {
            self.deadline = deadline;
        }
        if let Some(assigned_to) = updates.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(attachments) = updates.attachments {
            self.attachments = attachments;
        }
        self.status = status;
        Ok(())
    }

    /// Append a submission made at `now` and move to the matching terminal
    /// status. A task accepts exactly one submission.
    pub fn record_submission(
        &mut self,
        attachment: Attachment,
        now: DateTime<Utc>,
    ) -> DomainResult<&Submission> {
        if self.status.is_terminal() {
            return Err(DomainError::AlreadySubmitted(self.id.clone()));
        }

        let is_late = is_past_deadline(self.deadline, now);
        self.submissions.push(Submission {
            id: Uuid::new_v4().to_string(),
            submitted_at: now,
            is_late,
            attachment,
        });
        self.status = TaskStatus::after_submission(is_late);

        self.submissions
            .last()
            .ok_or_else(|| DomainError::Storage("submission was not recorded".into()))
    }

    /// Non-terminal and past its deadline.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && is_past_deadline(self.deadline, now)
    }
}
