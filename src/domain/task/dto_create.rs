use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Attachment;

/// New task payload. Required fields are checked by the caller
/// (`validate()`), not by the task service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub deadline: NaiveDate,
    #[validate(length(min = 1))]
    pub assigned_to: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_fails_validation() {
        let dto = CreateTaskDto {
            title: String::new(),
            description: "d".into(),
            deadline: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            assigned_to: "e1".into(),
            attachments: Vec::new(),
        };
        assert!(dto.validate().is_err());
    }
}
