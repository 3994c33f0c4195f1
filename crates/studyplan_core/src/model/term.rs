//! Term domain model.
//!
//! # Invariants
//! - `end_date` is strictly after `start_date` once validated.
//! - A term owns zero or more courses; deleting it removes them all.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Storage identity of a term (SQLite rowid).
pub type TermId = i64;

/// Top-level academic period container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// `None` until the store assigns identity on first insert.
    pub id: Option<TermId>,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Term {
    /// Creates an unsaved term.
    pub fn new(title: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            title: title.into(),
            start_date,
            end_date,
        }
    }

    /// Returns whether this term already has a storage identity.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
