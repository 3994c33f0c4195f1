//! Planner repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide storage primitives (insert, update, delete-by-id, ordered
//!   queries) for terms, courses and assessments.
//! - Keep SQL details inside the persistence boundary; cascade rules live in
//!   the service layer on top of these primitives.
//!
//! # Invariants
//! - Listing order is part of the contract and identical across
//!   implementations (see each method).
//! - Read paths reject invalid persisted enum/flag values instead of masking
//!   them.
//! - `with_transaction` either commits everything `f` did or nothing.

use crate::db::DbError;
use crate::model::assessment::{Assessment, AssessmentId, AssessmentType};
use crate::model::course::{Course, CourseId, CourseStatus};
use crate::model::status_option::StatusOption;
use crate::model::term::{Term, TermId};
use crate::model::EntityKind;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TERM_SELECT_SQL: &str = "SELECT id, title, start_date, end_date FROM terms";

const COURSE_SELECT_SQL: &str = "SELECT
    id,
    term_id,
    title,
    start_date,
    end_date,
    status,
    instructor_name,
    instructor_phone,
    instructor_email,
    notes,
    start_alert_enabled,
    end_alert_enabled
FROM courses";

const ASSESSMENT_SELECT_SQL: &str = "SELECT
    id,
    course_id,
    type,
    title,
    start_date,
    due_date,
    start_alert_enabled,
    end_alert_enabled
FROM assessments";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for planner persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Storage backend failure (I/O, SQL, constraint).
    Db(DbError),
    /// Update or delete targeted a row that does not exist.
    NotFound { entity: EntityKind, id: i64 },
    /// Persisted row cannot be converted to a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted planner data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage primitives behind the planner service.
///
/// Implementations must not cascade on their own: `delete_*_row` removes
/// exactly one row.
pub trait PlannerRepository {
    /// Terms ordered by `start_date ASC, id ASC`.
    fn list_terms(&self) -> RepoResult<Vec<Term>>;
    fn get_term(&self, id: TermId) -> RepoResult<Option<Term>>;
    fn count_terms(&self) -> RepoResult<u64>;
    /// Inserts and returns the assigned identity; `term.id` is ignored.
    fn insert_term(&self, term: &Term) -> RepoResult<TermId>;
    fn update_term(&self, id: TermId, term: &Term) -> RepoResult<()>;
    fn delete_term_row(&self, id: TermId) -> RepoResult<()>;

    /// Courses of one term ordered by `start_date ASC, id ASC`.
    fn list_courses_for_term(&self, term_id: TermId) -> RepoResult<Vec<Course>>;
    fn count_courses_for_term(&self, term_id: TermId) -> RepoResult<u64>;
    /// Every course ordered by `title ASC, id ASC`.
    fn list_all_courses(&self) -> RepoResult<Vec<Course>>;
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    fn insert_course(&self, course: &Course) -> RepoResult<CourseId>;
    fn update_course(&self, id: CourseId, course: &Course) -> RepoResult<()>;
    fn delete_course_row(&self, id: CourseId) -> RepoResult<()>;

    /// Assessments of one course ordered by `type ASC, id ASC`.
    fn list_assessments_for_course(&self, course_id: CourseId) -> RepoResult<Vec<Assessment>>;
    /// Every assessment ordered by `due_date ASC` (unset first), then `id ASC`.
    fn list_all_assessments(&self) -> RepoResult<Vec<Assessment>>;
    fn get_assessment(&self, id: AssessmentId) -> RepoResult<Option<Assessment>>;
    fn insert_assessment(&self, assessment: &Assessment) -> RepoResult<AssessmentId>;
    fn update_assessment(&self, id: AssessmentId, assessment: &Assessment) -> RepoResult<()>;
    fn delete_assessment_row(&self, id: AssessmentId) -> RepoResult<()>;

    /// Picker options ordered by `category ASC, order ASC`.
    fn list_status_options(&self) -> RepoResult<Vec<StatusOption>>;

    /// Runs `f` atomically: on `Err` every write made by `f` is discarded.
    fn with_transaction<T, F>(&self, f: F) -> RepoResult<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> RepoResult<T>;
}

/// SQLite-backed planner repository.
pub struct SqlitePlannerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlannerRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PlannerRepository for SqlitePlannerRepository<'_> {
    fn list_terms(&self) -> RepoResult<Vec<Term>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TERM_SELECT_SQL} ORDER BY start_date ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut terms = Vec::new();
        while let Some(row) = rows.next()? {
            terms.push(parse_term_row(row)?);
        }
        Ok(terms)
    }

    fn get_term(&self, id: TermId) -> RepoResult<Option<Term>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TERM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_term_row(row)?));
        }
        Ok(None)
    }

    fn count_terms(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM terms;", [], |row| row.get(0))?;
        Ok(count_to_u64(count))
    }

    fn insert_term(&self, term: &Term) -> RepoResult<TermId> {
        self.conn.execute(
            "INSERT INTO terms (title, start_date, end_date) VALUES (?1, ?2, ?3);",
            params![term.title.as_str(), term.start_date, term.end_date],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_term(&self, id: TermId, term: &Term) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE terms
             SET title = ?1, start_date = ?2, end_date = ?3
             WHERE id = ?4;",
            params![term.title.as_str(), term.start_date, term.end_date, id],
        )?;
        ensure_changed(changed, EntityKind::Term, id)
    }

    fn delete_term_row(&self, id: TermId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM terms WHERE id = ?1;", [id])?;
        ensure_changed(changed, EntityKind::Term, id)
    }

    fn list_courses_for_term(&self, term_id: TermId) -> RepoResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL}
             WHERE term_id = ?1
             ORDER BY start_date ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([term_id])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }
        Ok(courses)
    }

    fn count_courses_for_term(&self, term_id: TermId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM courses WHERE term_id = ?1;",
            [term_id],
            |row| row.get(0),
        )?;
        Ok(count_to_u64(count))
    }

    fn list_all_courses(&self) -> RepoResult<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} ORDER BY title ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }
        Ok(courses)
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_course_row(row)?));
        }
        Ok(None)
    }

    fn insert_course(&self, course: &Course) -> RepoResult<CourseId> {
        self.conn.execute(
            "INSERT INTO courses (
                term_id,
                title,
                start_date,
                end_date,
                status,
                instructor_name,
                instructor_phone,
                instructor_email,
                notes,
                start_alert_enabled,
                end_alert_enabled
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                course.term_id,
                course.title.as_str(),
                course.start_date,
                course.end_date,
                course_status_to_db(course.status),
                course.instructor_name.as_str(),
                course.instructor_phone.as_str(),
                course.instructor_email.as_str(),
                course.notes.as_str(),
                bool_to_int(course.start_alert_enabled),
                bool_to_int(course.end_alert_enabled),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_course(&self, id: CourseId, course: &Course) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE courses
             SET
                term_id = ?1,
                title = ?2,
                start_date = ?3,
                end_date = ?4,
                status = ?5,
                instructor_name = ?6,
                instructor_phone = ?7,
                instructor_email = ?8,
                notes = ?9,
                start_alert_enabled = ?10,
                end_alert_enabled = ?11
             WHERE id = ?12;",
            params![
                course.term_id,
                course.title.as_str(),
                course.start_date,
                course.end_date,
                course_status_to_db(course.status),
                course.instructor_name.as_str(),
                course.instructor_phone.as_str(),
                course.instructor_email.as_str(),
                course.notes.as_str(),
                bool_to_int(course.start_alert_enabled),
                bool_to_int(course.end_alert_enabled),
                id,
            ],
        )?;
        ensure_changed(changed, EntityKind::Course, id)
    }

    fn delete_course_row(&self, id: CourseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?1;", [id])?;
        ensure_changed(changed, EntityKind::Course, id)
    }

    fn list_assessments_for_course(&self, course_id: CourseId) -> RepoResult<Vec<Assessment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSESSMENT_SELECT_SQL}
             WHERE course_id = ?1
             ORDER BY type ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([course_id])?;
        let mut assessments = Vec::new();
        while let Some(row) = rows.next()? {
            assessments.push(parse_assessment_row(row)?);
        }
        Ok(assessments)
    }

    fn list_all_assessments(&self) -> RepoResult<Vec<Assessment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSESSMENT_SELECT_SQL} ORDER BY due_date ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut assessments = Vec::new();
        while let Some(row) = rows.next()? {
            assessments.push(parse_assessment_row(row)?);
        }
        Ok(assessments)
    }

    fn get_assessment(&self, id: AssessmentId) -> RepoResult<Option<Assessment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSESSMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_assessment_row(row)?));
        }
        Ok(None)
    }

    fn insert_assessment(&self, assessment: &Assessment) -> RepoResult<AssessmentId> {
        self.conn.execute(
            "INSERT INTO assessments (
                course_id,
                type,
                title,
                start_date,
                due_date,
                start_alert_enabled,
                end_alert_enabled
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                assessment.course_id,
                assessment_type_to_db(assessment.kind),
                assessment.title.as_str(),
                assessment.start_date,
                assessment.due_date,
                bool_to_int(assessment.start_alert_enabled),
                bool_to_int(assessment.end_alert_enabled),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_assessment(&self, id: AssessmentId, assessment: &Assessment) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE assessments
             SET
                course_id = ?1,
                type = ?2,
                title = ?3,
                start_date = ?4,
                due_date = ?5,
                start_alert_enabled = ?6,
                end_alert_enabled = ?7
             WHERE id = ?8;",
            params![
                assessment.course_id,
                assessment_type_to_db(assessment.kind),
                assessment.title.as_str(),
                assessment.start_date,
                assessment.due_date,
                bool_to_int(assessment.start_alert_enabled),
                bool_to_int(assessment.end_alert_enabled),
                id,
            ],
        )?;
        ensure_changed(changed, EntityKind::Assessment, id)
    }

    fn delete_assessment_row(&self, id: AssessmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM assessments WHERE id = ?1;", [id])?;
        ensure_changed(changed, EntityKind::Assessment, id)
    }

    fn list_status_options(&self) -> RepoResult<Vec<StatusOption>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category, code, label, sort_order
             FROM status_options
             ORDER BY category ASC, sort_order ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut options = Vec::new();
        while let Some(row) = rows.next()? {
            options.push(StatusOption {
                id: row.get("id")?,
                category: row.get("category")?,
                code: row.get("code")?,
                label: row.get("label")?,
                order: row.get("sort_order")?,
            });
        }
        Ok(options)
    }

    fn with_transaction<T, F>(&self, f: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        // Dropping `tx` without commit rolls back.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }
}

fn parse_term_row(row: &Row<'_>) -> RepoResult<Term> {
    Ok(Term {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
    })
}

fn parse_course_row(row: &Row<'_>) -> RepoResult<Course> {
    let status_value: i64 = row.get("status")?;
    let status = parse_course_status(status_value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid course status `{status_value}` in courses.status"
        ))
    })?;

    Ok(Course {
        id: Some(row.get("id")?),
        term_id: row.get("term_id")?,
        title: row.get("title")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        status,
        instructor_name: row.get("instructor_name")?,
        instructor_phone: row.get("instructor_phone")?,
        instructor_email: row.get("instructor_email")?,
        notes: row.get("notes")?,
        start_alert_enabled: parse_flag(row, "courses", "start_alert_enabled")?,
        end_alert_enabled: parse_flag(row, "courses", "end_alert_enabled")?,
    })
}

fn parse_assessment_row(row: &Row<'_>) -> RepoResult<Assessment> {
    let type_value: i64 = row.get("type")?;
    let kind = parse_assessment_type(type_value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid assessment type `{type_value}` in assessments.type"
        ))
    })?;

    Ok(Assessment {
        id: Some(row.get("id")?),
        course_id: row.get("course_id")?,
        kind,
        title: row.get("title")?,
        start_date: row.get("start_date")?,
        due_date: row.get("due_date")?,
        start_alert_enabled: parse_flag(row, "assessments", "start_alert_enabled")?,
        end_alert_enabled: parse_flag(row, "assessments", "end_alert_enabled")?,
    })
}

fn parse_flag(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {table}.{column}"
        ))),
    }
}

fn ensure_changed(changed: usize, entity: EntityKind, id: i64) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

fn course_status_to_db(status: CourseStatus) -> i64 {
    match status {
        CourseStatus::PlanToTake => 0,
        CourseStatus::InProgress => 1,
        CourseStatus::Completed => 2,
        CourseStatus::Dropped => 3,
    }
}

fn parse_course_status(value: i64) -> Option<CourseStatus> {
    match value {
        0 => Some(CourseStatus::PlanToTake),
        1 => Some(CourseStatus::InProgress),
        2 => Some(CourseStatus::Completed),
        3 => Some(CourseStatus::Dropped),
        _ => None,
    }
}

fn assessment_type_to_db(kind: AssessmentType) -> i64 {
    match kind {
        AssessmentType::Performance => 0,
        AssessmentType::Objective => 1,
    }
}

fn parse_assessment_type(value: i64) -> Option<AssessmentType> {
    match value {
        0 => Some(AssessmentType::Performance),
        1 => Some(AssessmentType::Objective),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
