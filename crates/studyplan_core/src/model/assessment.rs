//! Assessment domain model.
//!
//! # Invariants
//! - `course_id` references a live course.
//! - `due_date == None` is the unset sentinel and never passes validation.
//! - `AssessmentType` ordering is `Performance < Objective`; storage listings
//!   rely on it.

use crate::model::course::CourseId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Storage identity of an assessment (SQLite rowid).
pub type AssessmentId = i64;

/// Kind of gradable deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    Performance,
    Objective,
}

impl AssessmentType {
    /// Stable code name used in exports and search.
    pub fn code(self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::Objective => "Objective",
        }
    }
}

/// Gradable deliverable belonging to one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Option<AssessmentId>,
    pub course_id: CourseId,
    /// Serialized as `type` to match the exported column name.
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub title: String,
    pub start_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub start_alert_enabled: bool,
    pub end_alert_enabled: bool,
}

impl Assessment {
    /// Creates an unsaved assessment with alerts disabled.
    pub fn new(
        course_id: CourseId,
        kind: AssessmentType,
        title: impl Into<String>,
        start_date: NaiveDate,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: None,
            course_id,
            kind,
            title: title.into(),
            start_date,
            due_date,
            start_alert_enabled: false,
            end_alert_enabled: false,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
