//! Substring search over planner entities.
//!
//! # Invariants
//! - Blank queries return no hits and perform no reads.
//! - Matching is case-insensitive substring on a per-kind match text.
//! - Hits are ordered by kind name, then title, both ordinal.

use crate::model::assessment::Assessment;
use crate::model::course::Course;
use crate::model::term::Term;
use crate::model::EntityKind;
use crate::repo::planner_repo::PlannerRepository;
use crate::service::planner_service::{PlannerService, ServiceResult};
use log::debug;
use serde::Serialize;

/// One matched entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub kind: EntityKind,
    pub id: i64,
    pub title: String,
    pub subtitle: String,
}

/// Runs `query` against every term, course and assessment.
///
/// # Errors
/// - Propagates planner read failures.
pub fn search_entities<R: PlannerRepository>(
    service: &PlannerService<R>,
    query: &str,
) -> ServiceResult<Vec<SearchHit>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    let mut hits = Vec::new();
    hits.extend(
        service
            .terms()?
            .iter()
            .filter(|term| matches(&term.title, &needle))
            .filter_map(term_hit),
    );
    hits.extend(
        service
            .all_courses()?
            .iter()
            .filter(|course| matches(&course_match_text(course), &needle))
            .filter_map(course_hit),
    );
    hits.extend(
        service
            .all_assessments()?
            .iter()
            .filter(|assessment| matches(&assessment_match_text(assessment), &needle))
            .filter_map(assessment_hit),
    );

    hits.sort_by(|a, b| {
        a.kind
            .as_str()
            .cmp(b.kind.as_str())
            .then_with(|| a.title.cmp(&b.title))
    });
    debug!(
        "event=search module=search status=ok query_len={} hits={}",
        needle.chars().count(),
        hits.len()
    );
    Ok(hits)
}

fn matches(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(needle)
}

fn course_match_text(course: &Course) -> String {
    format!(
        "{} {} {} {} {}",
        course.title,
        course.status.code(),
        course.instructor_name,
        course.instructor_email,
        course.instructor_phone
    )
}

fn assessment_match_text(assessment: &Assessment) -> String {
    format!("{} {}", assessment.title, assessment.kind.code())
}

fn term_hit(term: &Term) -> Option<SearchHit> {
    Some(SearchHit {
        kind: EntityKind::Term,
        id: term.id?,
        title: term.title.clone(),
        subtitle: format!("{} to {}", term.start_date, term.end_date),
    })
}

fn course_hit(course: &Course) -> Option<SearchHit> {
    Some(SearchHit {
        kind: EntityKind::Course,
        id: course.id?,
        title: course.title.clone(),
        subtitle: course.status.label().to_string(),
    })
}

fn assessment_hit(assessment: &Assessment) -> Option<SearchHit> {
    let subtitle = match assessment.due_date {
        Some(due) => format!("{} due {due}", assessment.kind.code()),
        None => assessment.kind.code().to_string(),
    };
    Some(SearchHit {
        kind: EntityKind::Assessment,
        id: assessment.id?,
        title: assessment.title.clone(),
        subtitle,
    })
}
