use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::StageError;

/// A notice scraped from the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub department: String,
    pub date: NaiveDate,
    pub content: String,
}

impl Record {
    pub fn new(
        title: impl Into<String>,
        department: impl Into<String>,
        date: NaiveDate,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            department: department.into(),
            date,
            content: content.into(),
        }
    }

    /// Check the fields a digest needs are present. `index` is the record's
    /// position in the scraped list, used in the error.
    pub fn validate(&self, index: usize) -> Result<(), StageError> {
        if self.title.trim().is_empty() {
            return Err(StageError::MissingField {
                index,
                field: "title",
            });
        }
        if self.department.trim().is_empty() {
            return Err(StageError::MissingField {
                index,
                field: "department",
            });
        }
        Ok(())
    }
}
