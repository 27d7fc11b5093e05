//! Read-side helpers for dashboards and the calendar.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Task, TaskStatus};

/// Counters shown on the dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub late: usize,
    /// Not yet submitted and already past the deadline.
    pub overdue: usize,
}

impl TaskStats {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, now: DateTime<Utc>) -> Self {
        let mut stats = Self::default();
        for task in tasks {
            stats.total += 1;
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::LateSubmission => stats.late += 1,
            }
            if task.is_overdue(now) {
                stats.overdue += 1;
            }
        }
        stats
    }
}

/// Tasks with `from <= deadline <= to`, earliest deadline first.
pub fn due_between(tasks: Vec<Task>, from: NaiveDate, to: NaiveDate) -> Vec<Task> {
    let mut due: Vec<Task> = tasks
        .into_iter()
        .filter(|t| t.deadline >= from && t.deadline <= to)
        .collect();
    due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then_with(|| a.created_at.cmp(&b.created_at)));
    due
}
