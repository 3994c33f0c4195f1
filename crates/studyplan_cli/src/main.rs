//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open (or create) a planner database, seed it on first run and print a
//!   one-line summary per term.
//! - Optionally export the upcoming-assessments report to a directory.
//!
//! Usage: `studyplan_cli [DB_PATH|:memory:] [EXPORT_DIR]`

use chrono::{Local, Utc};
use std::process::ExitCode;
use studyplan_core::{
    export_upcoming_assessments, open_db, open_db_in_memory, DirectorySink, PlannerService,
    ReportRange, SqlitePlannerRepository,
};

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("studyplan: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let conn = match args.first().map(String::as_str) {
        None | Some(":memory:") => open_db_in_memory(),
        Some(path) => open_db(path),
    }
    .map_err(|err| err.to_string())?;

    let service = PlannerService::new(SqlitePlannerRepository::new(&conn));
    let today = Local::now().date_naive();
    let outcome = service.initialize(today).map_err(|err| err.to_string())?;
    println!("studyplan_core version={} seed={outcome:?}", studyplan_core::core_version());

    for term in service.terms().map_err(|err| err.to_string())? {
        let Some(term_id) = term.id else { continue };
        let courses = service
            .course_count_for_term(term_id)
            .map_err(|err| err.to_string())?;
        println!(
            "{term_id}\t{}\t{} to {}\tcourses={courses}",
            term.title, term.start_date, term.end_date
        );
    }

    if let Some(dir) = args.get(1) {
        let path = export_upcoming_assessments(
            &service,
            &DirectorySink::new(dir),
            &ReportRange::default_window(today),
            Utc::now(),
        )
        .map_err(|err| err.to_string())?;
        println!("report={}", path.display());
    }

    Ok(())
}
