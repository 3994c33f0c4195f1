//! Assessment report building and export.
//!
//! # Responsibility
//! - Own the report date range and its validation.
//! - Render CSV text from planner data (see [`csv`]).
//! - Hand rendered text to an [`ExportSink`] under a timestamped file name.
//!
//! # Invariants
//! - A range with `to < from` is rejected before anything is read or written.
//! - Export failures surface as [`ReportError`]; nothing panics.

pub mod csv;

use crate::repo::planner_repo::PlannerRepository;
use crate::service::planner_service::{PlannerService, ServiceError};
use crate::validation::{validate_report_range, ValidationError};
use chrono::{DateTime, Days, NaiveDate, Utc};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use csv::{
    build_assessment_csv, build_upcoming_report, escape_field, quote_field, DEFAULT_REPORT_TITLE,
};

const DEFAULT_LOOKBACK_DAYS: u64 = 7;
const DEFAULT_LOOKAHEAD_DAYS: u64 = 30;

pub type ReportResult<T> = Result<T, ReportError>;

/// Report-layer error.
#[derive(Debug)]
pub enum ReportError {
    InvalidRange(ValidationError),
    Service(ServiceError),
    Io(io::Error),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "report export failed: {err}"),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRange(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ServiceError> for ReportError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<io::Error> for ReportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Inclusive calendar-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// One week back through thirty days ahead of `today`.
    pub fn default_window(today: NaiveDate) -> Self {
        Self {
            from: today
                .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
                .unwrap_or(today),
            to: today
                .checked_add_days(Days::new(DEFAULT_LOOKAHEAD_DAYS))
                .unwrap_or(today),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn validate(&self) -> ReportResult<()> {
        validate_report_range(self.from, self.to).map_err(ReportError::InvalidRange)
    }
}

/// Destination for rendered report text.
pub trait ExportSink {
    /// Writes `contents` under `file_name` and returns where it landed.
    fn write_text(&self, file_name: &str, contents: &str) -> io::Result<PathBuf>;
}

/// Writes report files into one directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn write_text(&self, file_name: &str, contents: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

/// File name used for an upcoming-assessments export generated at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("Upcoming_Assessments_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Builds the multi-column upcoming report and writes it to `sink`.
///
/// # Errors
/// - [`ReportError::InvalidRange`] when `range.to < range.from`.
/// - [`ReportError::Service`] when planner reads fail.
/// - [`ReportError::Io`] when the sink cannot write.
pub fn export_upcoming_assessments<R: PlannerRepository>(
    service: &PlannerService<R>,
    sink: &dyn ExportSink,
    range: &ReportRange,
    now: DateTime<Utc>,
) -> ReportResult<PathBuf> {
    range.validate()?;

    let assessments = service.all_assessments()?;
    let courses = service.all_courses()?;
    let terms = service.terms()?;
    let contents = build_upcoming_report(&assessments, &courses, &terms, range, now);

    let rows = assessments
        .iter()
        .filter_map(|assessment| assessment.due_date)
        .filter(|due| range.contains(*due))
        .count();

    match sink.write_text(&export_file_name(now), &contents) {
        Ok(path) => {
            info!("event=report_export module=report status=ok rows={rows}");
            Ok(path)
        }
        Err(err) => {
            error!(
                "event=report_export module=report status=error error_kind={:?}",
                err.kind()
            );
            Err(ReportError::Io(err))
        }
    }
}
