//! In-memory planner repository.
//!
//! # Responsibility
//! - Satisfy the [`PlannerRepository`] contract without a database engine so
//!   service rules (cascade, upsert, seeding) can be unit tested.
//! - Allow unit tests to inject a storage failure on the Nth row delete.
//!
//! # Invariants
//! - Listing order matches the SQLite implementation exactly.
//! - Identities are never reused, mirroring `AUTOINCREMENT`.
//! - A failed `with_transaction` restores the pre-transaction snapshot.

use crate::db::DbError;
use crate::model::assessment::{Assessment, AssessmentId};
use crate::model::course::{Course, CourseId, CourseStatus};
use crate::model::status_option::{StatusOption, COURSE_STATUS_CATEGORY};
use crate::model::term::{Term, TermId};
use crate::model::EntityKind;
use crate::repo::planner_repo::{PlannerRepository, RepoError, RepoResult};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    last_term_id: TermId,
    last_course_id: CourseId,
    last_assessment_id: AssessmentId,
    terms: Vec<Term>,
    courses: Vec<Course>,
    assessments: Vec<Assessment>,
}

/// Planner repository backed by plain vectors.
#[derive(Debug, Default)]
pub struct InMemoryPlannerRepository {
    state: RefCell<MemoryState>,
    deletes_before_failure: Cell<Option<usize>>,
}

impl InMemoryPlannerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the row delete after `successful` further deletes fail with a
    /// storage error. The failure fires once.
    #[cfg(test)]
    pub(crate) fn fail_after_deletes(&self, successful: usize) {
        self.deletes_before_failure.set(Some(successful));
    }

    fn check_delete_failure(&self) -> RepoResult<()> {
        match self.deletes_before_failure.get() {
            Some(0) => {
                self.deletes_before_failure.set(None);
                Err(injected_io_error())
            }
            Some(remaining) => {
                self.deletes_before_failure.set(Some(remaining - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl PlannerRepository for InMemoryPlannerRepository {
    fn list_terms(&self) -> RepoResult<Vec<Term>> {
        let mut terms = self.state.borrow().terms.clone();
        terms.sort_by_key(|term| (term.start_date, term.id));
        Ok(terms)
    }

    fn get_term(&self, id: TermId) -> RepoResult<Option<Term>> {
        Ok(self
            .state
            .borrow()
            .terms
            .iter()
            .find(|term| term.id == Some(id))
            .cloned())
    }

    fn count_terms(&self) -> RepoResult<u64> {
        Ok(self.state.borrow().terms.len() as u64)
    }

    fn insert_term(&self, term: &Term) -> RepoResult<TermId> {
        let mut state = self.state.borrow_mut();
        state.last_term_id += 1;
        let id = state.last_term_id;
        state.terms.push(Term {
            id: Some(id),
            ..term.clone()
        });
        Ok(id)
    }

    fn update_term(&self, id: TermId, term: &Term) -> RepoResult<()> {
        let mut state = self.state.borrow_mut();
        let slot = state
            .terms
            .iter_mut()
            .find(|existing| existing.id == Some(id))
            .ok_or(RepoError::NotFound {
                entity: EntityKind::Term,
                id,
            })?;
        *slot = Term {
            id: Some(id),
            ..term.clone()
        };
        Ok(())
    }

    fn delete_term_row(&self, id: TermId) -> RepoResult<()> {
        self.check_delete_failure()?;
        let mut state = self.state.borrow_mut();
        let before = state.terms.len();
        state.terms.retain(|term| term.id != Some(id));
        ensure_removed(before, state.terms.len(), EntityKind::Term, id)
    }

    fn list_courses_for_term(&self, term_id: TermId) -> RepoResult<Vec<Course>> {
        let mut courses: Vec<Course> = self
            .state
            .borrow()
            .courses
            .iter()
            .filter(|course| course.term_id == term_id)
            .cloned()
            .collect();
        courses.sort_by_key(|course| (course.start_date, course.id));
        Ok(courses)
    }

    fn count_courses_for_term(&self, term_id: TermId) -> RepoResult<u64> {
        Ok(self
            .state
            .borrow()
            .courses
            .iter()
            .filter(|course| course.term_id == term_id)
            .count() as u64)
    }

    fn list_all_courses(&self) -> RepoResult<Vec<Course>> {
        let mut courses = self.state.borrow().courses.clone();
        courses.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(courses)
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        Ok(self
            .state
            .borrow()
            .courses
            .iter()
            .find(|course| course.id == Some(id))
            .cloned())
    }

    fn insert_course(&self, course: &Course) -> RepoResult<CourseId> {
        let mut state = self.state.borrow_mut();
        state.last_course_id += 1;
        let id = state.last_course_id;
        state.courses.push(Course {
            id: Some(id),
            ..course.clone()
        });
        Ok(id)
    }

    fn update_course(&self, id: CourseId, course: &Course) -> RepoResult<()> {
        let mut state = self.state.borrow_mut();
        let slot = state
            .courses
            .iter_mut()
            .find(|existing| existing.id == Some(id))
            .ok_or(RepoError::NotFound {
                entity: EntityKind::Course,
                id,
            })?;
        *slot = Course {
            id: Some(id),
            ..course.clone()
        };
        Ok(())
    }

    fn delete_course_row(&self, id: CourseId) -> RepoResult<()> {
        self.check_delete_failure()?;
        let mut state = self.state.borrow_mut();
        let before = state.courses.len();
        state.courses.retain(|course| course.id != Some(id));
        ensure_removed(before, state.courses.len(), EntityKind::Course, id)
    }

    fn list_assessments_for_course(&self, course_id: CourseId) -> RepoResult<Vec<Assessment>> {
        let mut assessments: Vec<Assessment> = self
            .state
            .borrow()
            .assessments
            .iter()
            .filter(|assessment| assessment.course_id == course_id)
            .cloned()
            .collect();
        assessments.sort_by_key(|assessment| (assessment.kind, assessment.id));
        Ok(assessments)
    }

    fn list_all_assessments(&self) -> RepoResult<Vec<Assessment>> {
        let mut assessments = self.state.borrow().assessments.clone();
        assessments.sort_by_key(|assessment| (assessment.due_date, assessment.id));
        Ok(assessments)
    }

    fn get_assessment(&self, id: AssessmentId) -> RepoResult<Option<Assessment>> {
        Ok(self
            .state
            .borrow()
            .assessments
            .iter()
            .find(|assessment| assessment.id == Some(id))
            .cloned())
    }

    fn insert_assessment(&self, assessment: &Assessment) -> RepoResult<AssessmentId> {
        let mut state = self.state.borrow_mut();
        state.last_assessment_id += 1;
        let id = state.last_assessment_id;
        state.assessments.push(Assessment {
            id: Some(id),
            ..assessment.clone()
        });
        Ok(id)
    }

    fn update_assessment(&self, id: AssessmentId, assessment: &Assessment) -> RepoResult<()> {
        let mut state = self.state.borrow_mut();
        let slot = state
            .assessments
            .iter_mut()
            .find(|existing| existing.id == Some(id))
            .ok_or(RepoError::NotFound {
                entity: EntityKind::Assessment,
                id,
            })?;
        *slot = Assessment {
            id: Some(id),
            ..assessment.clone()
        };
        Ok(())
    }

    fn delete_assessment_row(&self, id: AssessmentId) -> RepoResult<()> {
        self.check_delete_failure()?;
        let mut state = self.state.borrow_mut();
        let before = state.assessments.len();
        state.assessments.retain(|assessment| assessment.id != Some(id));
        ensure_removed(
            before,
            state.assessments.len(),
            EntityKind::Assessment,
            id,
        )
    }

    fn list_status_options(&self) -> RepoResult<Vec<StatusOption>> {
        Ok(CourseStatus::ALL
            .into_iter()
            .zip(1_i64..)
            .map(|(status, id)| StatusOption {
                id,
                category: COURSE_STATUS_CATEGORY.to_string(),
                code: status.code().to_string(),
                label: status.label().to_string(),
                order: id - 1,
            })
            .collect())
    }

    fn with_transaction<T, F>(&self, f: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        let snapshot = self.state.borrow().clone();
        let result = f(self);
        if result.is_err() {
            *self.state.borrow_mut() = snapshot;
        }
        result
    }
}

fn ensure_removed(before: usize, after: usize, entity: EntityKind, id: i64) -> RepoResult<()> {
    if before == after {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}

fn injected_io_error() -> RepoError {
    RepoError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
        Some("injected delete failure".to_string()),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::assessment::AssessmentType;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn identities_are_not_reused_after_delete() {
        let repo = InMemoryPlannerRepository::new();
        let term = Term::new("A", date(2025, 1, 1), date(2025, 2, 1));
        let first = repo.insert_term(&term).unwrap();
        repo.delete_term_row(first).unwrap();
        let second = repo.insert_term(&term).unwrap();
        assert!(second > first);
    }

    #[test]
    fn assessments_list_performance_first() {
        let repo = InMemoryPlannerRepository::new();
        let objective = Assessment::new(7, AssessmentType::Objective, "O", date(2025, 1, 1), None);
        let performance =
            Assessment::new(7, AssessmentType::Performance, "P", date(2025, 1, 1), None);
        repo.insert_assessment(&objective).unwrap();
        repo.insert_assessment(&performance).unwrap();

        let listed = repo.list_assessments_for_course(7).unwrap();
        assert_eq!(listed[0].kind, AssessmentType::Performance);
        assert_eq!(listed[1].kind, AssessmentType::Objective);
    }

    #[test]
    fn failed_transaction_restores_snapshot() {
        let repo = InMemoryPlannerRepository::new();
        let term = Term::new("Keep", date(2025, 1, 1), date(2025, 2, 1));
        let kept = repo.insert_term(&term).unwrap();

        let result: RepoResult<()> = repo.with_transaction(|repo| {
            repo.insert_term(&Term::new("Discard", date(2025, 3, 1), date(2025, 4, 1)))?;
            repo.delete_term_row(kept)?;
            Err(RepoError::InvalidData("abort".to_string()))
        });

        assert!(result.is_err());
        let terms = repo.list_terms().unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].id, Some(kept));
    }

    #[test]
    fn injected_failure_fires_once() {
        let repo = InMemoryPlannerRepository::new();
        let term = Term::new("T", date(2025, 1, 1), date(2025, 2, 1));
        let a = repo.insert_term(&term).unwrap();
        let b = repo.insert_term(&term).unwrap();

        repo.fail_after_deletes(0);
        assert!(matches!(repo.delete_term_row(a), Err(RepoError::Db(_))));
        repo.delete_term_row(a).unwrap();
        repo.delete_term_row(b).unwrap();
    }
}
