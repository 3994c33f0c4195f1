//! Picker lookup rows for enumerated course status.

use crate::model::course::CourseStatus;
use serde::{Deserialize, Serialize};

/// Category value used for course status rows.
pub const COURSE_STATUS_CATEGORY: &str = "CourseStatus";

/// One selectable option, seeded by migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
    pub id: i64,
    pub category: String,
    pub code: String,
    pub label: String,
    pub order: i64,
}

impl StatusOption {
    /// Resolves the typed status for course-status rows.
    ///
    /// Returns `None` for other categories or unknown codes.
    pub fn course_status(&self) -> Option<CourseStatus> {
        if self.category != COURSE_STATUS_CATEGORY {
            return None;
        }
        CourseStatus::from_code(&self.code)
    }
}
