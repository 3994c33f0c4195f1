//! Course domain model.
//!
//! # Responsibility
//! - Describe one unit of study inside a term, including instructor contact
//!   details and alert preferences.
//!
//! # Invariants
//! - `term_id` references a live term.
//! - Two assessment slots (performance/objective) are a caller convention;
//!   storage accepts any number.

use crate::model::term::TermId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Storage identity of a course (SQLite rowid).
pub type CourseId = i64;

/// Progress state of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    PlanToTake,
    InProgress,
    Completed,
    Dropped,
}

impl CourseStatus {
    /// All variants in display order.
    pub const ALL: [CourseStatus; 4] = [
        CourseStatus::PlanToTake,
        CourseStatus::InProgress,
        CourseStatus::Completed,
        CourseStatus::Dropped,
    ];

    /// Stable code name, also used as the searchable/exported status text.
    pub fn code(self) -> &'static str {
        match self {
            Self::PlanToTake => "PlanToTake",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Dropped => "Dropped",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::PlanToTake => "Plan to take",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Dropped => "Dropped",
        }
    }

    /// Parses a code name produced by [`CourseStatus::code`].
    pub fn from_code(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == value)
    }
}

/// Unit of study within a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Option<CourseId>,
    pub term_id: TermId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: CourseStatus,
    pub instructor_name: String,
    pub instructor_phone: String,
    pub instructor_email: String,
    /// Free-form notes; inner line breaks are preserved.
    pub notes: String,
    pub start_alert_enabled: bool,
    pub end_alert_enabled: bool,
}

impl Course {
    /// Creates an unsaved course under `term_id` with empty contact details.
    pub fn new(
        term_id: TermId,
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            term_id,
            title: title.into(),
            start_date,
            end_date,
            status: CourseStatus::default(),
            instructor_name: String::new(),
            instructor_phone: String::new(),
            instructor_email: String::new(),
            notes: String::new(),
            start_alert_enabled: false,
            end_alert_enabled: false,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
