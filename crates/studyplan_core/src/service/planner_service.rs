//! Planner use-case service.
//!
//! # Responsibility
//! - Expose the data store contract: ordered reads, upsert-by-identity
//!   saves, cascading deletes, and one-time seeding.
//! - Run validation before any write so no entity is partially persisted.
//!
//! # Invariants
//! - `save_*` inserts when `id == None` and updates in place otherwise; the
//!   returned entity always carries its identity.
//! - Deleting a term removes its courses and their assessments; deleting a
//!   course removes its assessments. Each cascade is one transaction.
//! - Seeding inserts exactly one term/course/assessment-pair subtree, only
//!   while the term table is empty.

use crate::model::assessment::{Assessment, AssessmentId, AssessmentType};
use crate::model::course::{Course, CourseId, CourseStatus};
use crate::model::status_option::StatusOption;
use crate::model::term::{Term, TermId};
use crate::model::EntityKind;
use crate::repo::planner_repo::{PlannerRepository, RepoError, RepoResult};
use crate::validation::{
    check_courses_within_term, validate_assessment, validate_course, validate_term,
    ValidationError,
};
use chrono::{Days, Months, NaiveDate};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for planner use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed validation; nothing was written.
    Validation(ValidationError),
    /// Target entity does not exist.
    NotFound { entity: EntityKind, id: i64 },
    /// Referenced parent does not exist.
    ParentNotFound { entity: EntityKind, id: i64 },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::ParentNotFound { entity, id } => {
                write!(f, "parent {entity} not found: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Everything removed by one cascading delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub term_ids: Vec<TermId>,
    pub course_ids: Vec<CourseId>,
    /// Removed assessments with their type; alert ids depend on both.
    pub assessments: Vec<(AssessmentId, AssessmentType)>,
}

impl CascadeSummary {
    pub fn is_empty(&self) -> bool {
        self.term_ids.is_empty() && self.course_ids.is_empty() && self.assessments.is_empty()
    }
}

/// Result of [`PlannerService::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Sample rows were inserted.
    Seeded {
        term_id: TermId,
        course_id: CourseId,
    },
    /// At least one term already existed; nothing was written.
    AlreadyPopulated,
}

/// Planner service facade over repository implementations.
pub struct PlannerService<R: PlannerRepository> {
    repo: R,
}

impl<R: PlannerRepository> PlannerService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Seeds sample data when no term exists yet.
    ///
    /// The emptiness check and all inserts share one transaction, so a crash
    /// mid-seed leaves no partial rows and a repeated call is a no-op.
    pub fn initialize(&self, today: NaiveDate) -> ServiceResult<SeedOutcome> {
        let outcome = self
            .repo
            .with_transaction(|repo| seed_if_empty(repo, today));
        match &outcome {
            Ok(SeedOutcome::Seeded { term_id, course_id }) => info!(
                "event=seed module=service status=ok term_id={term_id} course_id={course_id}"
            ),
            Ok(SeedOutcome::AlreadyPopulated) => {
                info!("event=seed module=service status=skipped reason=not_empty")
            }
            Err(err) => error!("event=seed module=service status=error error={err}"),
        }
        Ok(outcome?)
    }

    /// Terms ordered by start date.
    pub fn terms(&self) -> ServiceResult<Vec<Term>> {
        Ok(self.repo.list_terms()?)
    }

    pub fn get_term(&self, id: TermId) -> ServiceResult<Option<Term>> {
        Ok(self.repo.get_term(id)?)
    }

    /// Validates and upserts a term.
    ///
    /// For an already persisted term, its courses must still fit inside the
    /// new dates.
    pub fn save_term(&self, input: &Term) -> ServiceResult<Term> {
        let mut term = validate_term(input).into_result()?;

        match term.id {
            None => {
                term.id = Some(self.repo.insert_term(&term)?);
            }
            Some(id) => {
                let courses = self.repo.list_courses_for_term(id)?;
                let conflicts = check_courses_within_term(&term, &courses);
                if !conflicts.is_empty() {
                    return Err(ServiceError::Validation(ValidationError {
                        messages: conflicts,
                    }));
                }
                self.repo.update_term(id, &term)?;
            }
        }

        Ok(term)
    }

    /// Deletes a term, its courses and their assessments atomically.
    ///
    /// An unsaved term is a no-op and yields an empty summary.
    pub fn delete_term(&self, term: &Term) -> ServiceResult<CascadeSummary> {
        let Some(term_id) = term.id else {
            return Ok(CascadeSummary::default());
        };

        let summary = self.repo.with_transaction(|repo| {
            let mut summary = CascadeSummary::default();
            for course_id in repo
                .list_courses_for_term(term_id)?
                .into_iter()
                .filter_map(|course| course.id)
            {
                cascade_course(repo, course_id, &mut summary)?;
            }
            repo.delete_term_row(term_id)?;
            summary.term_ids.push(term_id);
            Ok(summary)
        });

        log_cascade(EntityKind::Term, term_id, &summary);
        Ok(summary?)
    }

    pub fn courses_for_term(&self, term_id: TermId) -> ServiceResult<Vec<Course>> {
        Ok(self.repo.list_courses_for_term(term_id)?)
    }

    pub fn course_count_for_term(&self, term_id: TermId) -> ServiceResult<u64> {
        Ok(self.repo.count_courses_for_term(term_id)?)
    }

    /// Every course ordered by title.
    pub fn all_courses(&self) -> ServiceResult<Vec<Course>> {
        Ok(self.repo.list_all_courses()?)
    }

    pub fn get_course(&self, id: CourseId) -> ServiceResult<Option<Course>> {
        Ok(self.repo.get_course(id)?)
    }

    /// Validates and upserts a course under an existing term.
    pub fn save_course(&self, input: &Course) -> ServiceResult<Course> {
        let mut course = validate_course(input).into_result()?;
        if self.repo.get_term(course.term_id)?.is_none() {
            return Err(ServiceError::ParentNotFound {
                entity: EntityKind::Term,
                id: course.term_id,
            });
        }

        match course.id {
            None => course.id = Some(self.repo.insert_course(&course)?),
            Some(id) => self.repo.update_course(id, &course)?,
        }
        Ok(course)
    }

    /// Deletes a course and its assessments atomically.
    pub fn delete_course(&self, course: &Course) -> ServiceResult<CascadeSummary> {
        let Some(course_id) = course.id else {
            return Ok(CascadeSummary::default());
        };

        let summary = self.repo.with_transaction(|repo| {
            let mut summary = CascadeSummary::default();
            cascade_course(repo, course_id, &mut summary)?;
            Ok(summary)
        });

        log_cascade(EntityKind::Course, course_id, &summary);
        Ok(summary?)
    }

    /// Assessments of one course, performance before objective.
    pub fn assessments_for_course(&self, course_id: CourseId) -> ServiceResult<Vec<Assessment>> {
        Ok(self.repo.list_assessments_for_course(course_id)?)
    }

    /// Every assessment ordered by due date.
    pub fn all_assessments(&self) -> ServiceResult<Vec<Assessment>> {
        Ok(self.repo.list_all_assessments()?)
    }

    pub fn get_assessment(&self, id: AssessmentId) -> ServiceResult<Option<Assessment>> {
        Ok(self.repo.get_assessment(id)?)
    }

    /// Validates and upserts an assessment under an existing course.
    pub fn save_assessment(&self, input: &Assessment) -> ServiceResult<Assessment> {
        let mut assessment = validate_assessment(input).into_result()?;
        if self.repo.get_course(assessment.course_id)?.is_none() {
            return Err(ServiceError::ParentNotFound {
                entity: EntityKind::Course,
                id: assessment.course_id,
            });
        }

        match assessment.id {
            None => assessment.id = Some(self.repo.insert_assessment(&assessment)?),
            Some(id) => self.repo.update_assessment(id, &assessment)?,
        }
        Ok(assessment)
    }

    /// Deletes one assessment; an unsaved assessment is a no-op.
    pub fn delete_assessment(&self, assessment: &Assessment) -> ServiceResult<()> {
        if let Some(id) = assessment.id {
            self.repo.delete_assessment_row(id)?;
            info!("event=delete module=service entity=assessment id={id} status=ok");
        }
        Ok(())
    }

    /// Picker options for enumerated fields.
    pub fn status_options(&self) -> ServiceResult<Vec<StatusOption>> {
        Ok(self.repo.list_status_options()?)
    }
}

fn cascade_course<R: PlannerRepository>(
    repo: &R,
    course_id: CourseId,
    summary: &mut CascadeSummary,
) -> RepoResult<()> {
    for assessment in repo.list_assessments_for_course(course_id)? {
        if let Some(id) = assessment.id {
            repo.delete_assessment_row(id)?;
            summary.assessments.push((id, assessment.kind));
        }
    }
    repo.delete_course_row(course_id)?;
    summary.course_ids.push(course_id);
    Ok(())
}

fn seed_if_empty<R: PlannerRepository>(repo: &R, today: NaiveDate) -> RepoResult<SeedOutcome> {
    if repo.count_terms()? > 0 {
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    let term_end = today
        .checked_add_months(Months::new(3))
        .unwrap_or(NaiveDate::MAX);
    let term_id = repo.insert_term(&Term::new("Term 1", today, term_end))?;

    let mut course = Course::new(term_id, "Sample Course", today, term_end);
    course.status = CourseStatus::InProgress;
    course.instructor_name = "Anika Patel".to_string();
    course.instructor_phone = "555-123-4567".to_string();
    course.instructor_email = "anika.patel@strimeuniversity.edu".to_string();
    let course_id = repo.insert_course(&course)?;

    repo.insert_assessment(&Assessment::new(
        course_id,
        AssessmentType::Performance,
        "Performance Assessment",
        today,
        today.checked_add_days(Days::new(7)),
    ))?;
    repo.insert_assessment(&Assessment::new(
        course_id,
        AssessmentType::Objective,
        "Objective Assessment",
        today,
        today.checked_add_days(Days::new(14)),
    ))?;

    Ok(SeedOutcome::Seeded { term_id, course_id })
}

fn log_cascade(entity: EntityKind, id: i64, summary: &RepoResult<CascadeSummary>) {
    match summary {
        Ok(summary) => info!(
            "event=cascade_delete module=service entity={} id={id} status=ok courses={} assessments={}",
            entity.as_str().to_ascii_lowercase(),
            summary.course_ids.len(),
            summary.assessments.len()
        ),
        Err(err) => error!(
            "event=cascade_delete module=service entity={} id={id} status=error rolled_back=true error={err}",
            entity.as_str().to_ascii_lowercase()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::memory_repo::InMemoryPlannerRepository;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service_with_subtree() -> (PlannerService<InMemoryPlannerRepository>, Term, Course) {
        let service = PlannerService::new(InMemoryPlannerRepository::new());
        let term = service
            .save_term(&Term::new("Fall", date(2025, 9, 1), date(2025, 12, 15)))
            .unwrap();
        let course = service
            .save_course(&Course::new(
                term.id.unwrap(),
                "CS 301",
                date(2025, 9, 2),
                date(2025, 12, 10),
            ))
            .unwrap();
        for (kind, title) in [
            (AssessmentType::Performance, "Project"),
            (AssessmentType::Objective, "Exam"),
        ] {
            service
                .save_assessment(&Assessment::new(
                    course.id.unwrap(),
                    kind,
                    title,
                    date(2025, 10, 1),
                    Some(date(2025, 11, 1)),
                ))
                .unwrap();
        }
        (service, term, course)
    }

    #[test]
    fn delete_term_cascades_through_memory_repository() {
        let (service, term, course) = service_with_subtree();

        let summary = service.delete_term(&term).unwrap();

        assert_eq!(summary.term_ids, vec![term.id.unwrap()]);
        assert_eq!(summary.course_ids, vec![course.id.unwrap()]);
        assert_eq!(summary.assessments.len(), 2);
        assert!(service.terms().unwrap().is_empty());
        assert!(service.all_courses().unwrap().is_empty());
        assert!(service.all_assessments().unwrap().is_empty());
    }

    #[test]
    fn failed_cascade_rolls_back_every_row() {
        let (service, term, _) = service_with_subtree();
        service.repository().fail_after_deletes(1);

        let err = service.delete_term(&term).unwrap_err();

        assert!(matches!(err, ServiceError::Repo(RepoError::Db(_))));
        assert_eq!(service.terms().unwrap().len(), 1);
        assert_eq!(service.all_courses().unwrap().len(), 1);
        assert_eq!(service.all_assessments().unwrap().len(), 2);
    }

    #[test]
    fn unsaved_entities_delete_as_noop() {
        let service = PlannerService::new(InMemoryPlannerRepository::new());
        let term = Term::new("Draft", date(2025, 1, 1), date(2025, 2, 1));
        assert!(service.delete_term(&term).unwrap().is_empty());
    }

    #[test]
    fn validation_blocks_write() {
        let service = PlannerService::new(InMemoryPlannerRepository::new());
        let err = service
            .save_term(&Term::new("", date(2025, 2, 1), date(2025, 1, 1)))
            .unwrap_err();
        match err {
            ServiceError::Validation(err) => assert_eq!(err.messages.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(service.repository().count_terms().unwrap(), 0);
    }

    #[test]
    fn initialize_seeds_once() {
        let service = PlannerService::new(InMemoryPlannerRepository::new());
        let today = date(2025, 1, 31);

        let first = service.initialize(today).unwrap();
        let second = service.initialize(today).unwrap();

        assert!(matches!(first, SeedOutcome::Seeded { .. }));
        assert_eq!(second, SeedOutcome::AlreadyPopulated);
        let terms = service.terms().unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].end_date, date(2025, 4, 30));
        assert_eq!(service.all_assessments().unwrap().len(), 2);
    }
}
