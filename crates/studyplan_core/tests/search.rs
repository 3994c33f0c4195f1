use chrono::NaiveDate;
use studyplan_core::db::open_db_in_memory;
use studyplan_core::{
    search_entities, Course, EntityKind, PlannerService, SqlitePlannerRepository, Term,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn empty_query_returns_no_hits() {
    let conn = open_db_in_memory().unwrap();
    let service = PlannerService::new(SqlitePlannerRepository::new(&conn));
    service.initialize(date(2025, 9, 1)).unwrap();

    assert!(search_entities(&service, "").unwrap().is_empty());
    assert!(search_entities(&service, " \t ").unwrap().is_empty());
}

#[test]
fn instructor_email_substring_finds_course() {
    let conn = open_db_in_memory().unwrap();
    let service = PlannerService::new(SqlitePlannerRepository::new(&conn));
    let term_id = service
        .save_term(&Term::new("Fall", date(2025, 9, 1), date(2025, 12, 15)))
        .unwrap()
        .id
        .unwrap();
    let mut course = Course::new(term_id, "CS 301", date(2025, 9, 2), date(2025, 12, 10));
    course.instructor_email = "grace.hopper@navy.mil".to_string();
    let course_id = service.save_course(&course).unwrap().id.unwrap();

    let hits = search_entities(&service, "HOPPER@NAVY").unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, EntityKind::Course);
    assert_eq!(hits[0].id, course_id);
    assert_eq!(hits[0].title, "CS 301");
}

#[test]
fn seeded_data_matches_by_assessment_type() {
    let conn = open_db_in_memory().unwrap();
    let service = PlannerService::new(SqlitePlannerRepository::new(&conn));
    service.initialize(date(2025, 9, 1)).unwrap();

    let hits = search_entities(&service, "performance").unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, EntityKind::Assessment);
    assert_eq!(hits[0].title, "Performance Assessment");
}

#[test]
fn hits_of_one_kind_are_ordered_by_title() {
    let conn = open_db_in_memory().unwrap();
    let service = PlannerService::new(SqlitePlannerRepository::new(&conn));
    for title in ["Zoology lab", "Algebra lab", "Mechanics lab"] {
        service
            .save_term(&Term::new(title, date(2025, 9, 1), date(2025, 12, 15)))
            .unwrap();
    }

    let titles: Vec<String> = search_entities(&service, "lab")
        .unwrap()
        .into_iter()
        .map(|hit| hit.title)
        .collect();

    assert_eq!(titles, vec!["Algebra lab", "Mechanics lab", "Zoology lab"]);
}
