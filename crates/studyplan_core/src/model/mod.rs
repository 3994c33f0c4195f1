//! Domain model for the term -> course -> assessment hierarchy.
//!
//! # Responsibility
//! - Define canonical records passed between validation, persistence,
//!   reporting and search.
//! - Keep enumerated fields closed so every match site stays exhaustive.
//!
//! # Invariants
//! - `id == None` means "not yet persisted"; identity is assigned by storage.
//! - Parent references (`term_id`, `course_id`) always point at live rows.

pub mod assessment;
pub mod course;
pub mod status_option;
pub mod term;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Discriminates the three stored entity kinds in errors and search hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Term,
    Course,
    Assessment,
}

impl EntityKind {
    /// Display name; search results are ordered by it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Term => "Term",
            Self::Course => "Course",
            Self::Assessment => "Assessment",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
