use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Task lifecycle status. See [`super::status`] for the allowed moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    #[serde(rename = "Late Submission")]
    LateSubmission,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::LateSubmission => "Late Submission",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "latesubmission" | "late" => Ok(Self::LateSubmission),
            _ => Err(format!("unknown task status: {s}")),
        }
    }
}

/// Opaque descriptor of an uploaded file. The core never reads the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub file_size: u64,
    /// Where the content lives (blob URL, path, object key...)
    pub url: String,
}

/// One hand-in by the assignee. Owned by its task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub submitted_at: DateTime<Utc>,
    /// Fixed at submission time, never recomputed.
    pub is_late: bool,
    #[serde(flatten)]
    pub attachment: Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub deadline: NaiveDate,
    /// User id of the single assignee. May dangle after a user is deleted.
    pub assigned_to: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub submissions: Vec<Submission>,
    /// Reference material attached by the task's creator.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn latest_submission(&self) -> Option<&Submission> {
        self.submissions.last()
    }
}
