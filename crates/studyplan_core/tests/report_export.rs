use chrono::{NaiveDate, TimeZone, Utc};
use std::io;
use std::path::PathBuf;
use studyplan_core::db::open_db_in_memory;
use studyplan_core::{
    build_assessment_csv, export_upcoming_assessments, Assessment, AssessmentType, Course,
    DirectorySink, ExportSink, PlannerService, ReportError, ReportRange, SqlitePlannerRepository,
    Term,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct FailingSink;

impl ExportSink for FailingSink {
    fn write_text(&self, _file_name: &str, _contents: &str) -> io::Result<PathBuf> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}

#[test]
fn minimal_csv_contains_header_and_quoted_title_row() {
    let mut assessment = Assessment::new(
        1,
        AssessmentType::Performance,
        "Perf A",
        date(2025, 2, 1),
        Some(date(2025, 2, 10)),
    );
    assessment.id = Some(1);
    let range = ReportRange::new(date(2025, 1, 1), date(2025, 12, 31));

    let csv = build_assessment_csv(
        &[assessment],
        &range,
        "Upcoming Assessments Report",
        Utc::now(),
    );

    assert!(csv
        .lines()
        .any(|line| line == "AssessmentId,Type,Title,StartDate,DueDate"));
    assert!(csv
        .lines()
        .any(|line| line == "1,Performance,\"Perf A\",2025-02-01,2025-02-10"));
}

#[test]
fn export_writes_timestamped_file_with_resolved_parents() {
    let conn = open_db_in_memory().unwrap();
    let service = PlannerService::new(SqlitePlannerRepository::new(&conn));
    let term_id = service
        .save_term(&Term::new("Fall", date(2025, 9, 1), date(2025, 12, 15)))
        .unwrap()
        .id
        .unwrap();
    let course_id = service
        .save_course(&Course::new(term_id, "CS 301", date(2025, 9, 2), date(2025, 12, 10)))
        .unwrap()
        .id
        .unwrap();
    service
        .save_assessment(&Assessment::new(
            course_id,
            AssessmentType::Objective,
            "Midterm, part 1",
            date(2025, 10, 1),
            Some(date(2025, 10, 20)),
        ))
        .unwrap();
    service
        .save_assessment(&Assessment::new(
            course_id,
            AssessmentType::Performance,
            "Capstone",
            date(2025, 11, 1),
            Some(date(2025, 12, 9)),
        ))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path().join("reports"));
    let now = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
    let range = ReportRange::new(date(2025, 10, 1), date(2025, 10, 31));

    let path = export_upcoming_assessments(&service, &sink, &range, now).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "Upcoming_Assessments_20251001_120000.csv"
    );
    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[4],
        "\"Midterm, part 1\",Objective,2025-10-20,CS 301,PlanToTake,Fall,2025-09-01,2025-12-15"
    );
}

#[test]
fn export_rejects_inverted_range_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let service = PlannerService::new(SqlitePlannerRepository::new(&conn));
    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path().join("never"));

    let err = export_upcoming_assessments(
        &service,
        &sink,
        &ReportRange::new(date(2025, 2, 1), date(2025, 1, 1)),
        Utc::now(),
    )
    .unwrap_err();

    assert!(matches!(err, ReportError::InvalidRange(_)));
    assert!(!sink.dir().exists());
}

#[test]
fn sink_failure_surfaces_as_io_error() {
    let conn = open_db_in_memory().unwrap();
    let service = PlannerService::new(SqlitePlannerRepository::new(&conn));

    let err = export_upcoming_assessments(
        &service,
        &FailingSink,
        &ReportRange::default_window(date(2025, 1, 1)),
        Utc::now(),
    )
    .unwrap_err();

    match err {
        ReportError::Io(io_err) => assert_eq!(io_err.kind(), io::ErrorKind::PermissionDenied),
        other => panic!("unexpected error: {other}"),
    }
}
