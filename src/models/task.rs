use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CrmError, Result};

/// Date format accepted for due dates and used in storage
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A follow-up item attached to a contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpTask {
    pub id: i64,
    pub contact_id: i64,
    pub task: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
}

impl FollowUpTask {
    /// Mark as done. Completing twice is harmless.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    pub fn due_label(&self) -> String {
        match self.due_date {
            Some(d) => d.format(DUE_DATE_FORMAT).to_string(),
            None => "no date".to_string(),
        }
    }
}

/// Parse a due date from form/CLI input. Empty input means "no date".
pub fn parse_due_date(input: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| CrmError::InvalidInput(format!("due date '{}' is not YYYY-MM-DD", raw)))
}
