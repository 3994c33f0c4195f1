//! Core domain logic for the study planner.
//! This crate is the single source of truth for term, course and assessment
//! invariants.

pub mod alerts;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod report;
pub mod search;
pub mod service;
pub mod validation;

pub use db::{default_db_path, open_db, open_db_in_memory, DbError, DEFAULT_DB_FILE_NAME};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::assessment::{Assessment, AssessmentId, AssessmentType};
pub use model::course::{Course, CourseId, CourseStatus};
pub use model::status_option::StatusOption;
pub use model::term::{Term, TermId};
pub use model::EntityKind;
pub use repo::memory_repo::InMemoryPlannerRepository;
pub use repo::planner_repo::{PlannerRepository, RepoError, RepoResult, SqlitePlannerRepository};
pub use report::{
    build_assessment_csv, build_upcoming_report, export_upcoming_assessments, DirectorySink,
    ExportSink, ReportError, ReportRange, ReportResult,
};
pub use search::{search_entities, SearchHit};
pub use service::planner_service::{
    CascadeSummary, PlannerService, SeedOutcome, ServiceError, ServiceResult,
};
pub use validation::{ValidationError, Validated};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
