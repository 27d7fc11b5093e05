use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Attachment, TaskStatus};

/// Partial task edit. `None` leaves the field untouched. Submissions are
/// not editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub status: Option<TaskStatus>,
    pub attachments: Option<Vec<Attachment>>,
}
